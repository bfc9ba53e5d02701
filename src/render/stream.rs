//! 绘图指令流
//!
//! 渲染引擎总是提供 `cm`（set_matrix）和 `Tm`（set_text_matrix）两个基础指令；
//! `transform` 和 `text_matrix` 是可选的原生原语，没有时由兼容层用基础指令代替。

use std::fmt;

use crate::error::RenderError;

/// 2-D 仿射矩阵 `[a b c d e f]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Matrix {
    pub const IDENTITY: Matrix = Matrix::new(1.0, 0.0, 0.0, 1.0, 0.0, 0.0);

    pub const fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self { a, b, c, d, e, f }
    }

    pub const fn translate(x: f64, y: f64) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, x, y)
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {} {}",
            self.a, self.b, self.c, self.d, self.e, self.f
        )
    }
}

/// 可选的绘图原语
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Transform,
    TextMatrix,
}

impl Primitive {
    pub const ALL: [Primitive; 2] = [Primitive::Transform, Primitive::TextMatrix];

    pub fn name(self) -> &'static str {
        match self {
            Primitive::Transform => "transform",
            Primitive::TextMatrix => "text_matrix",
        }
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 引擎原生提供的原语
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    pub transform: bool,
    pub text_matrix: bool,
}

impl Capabilities {
    pub const NATIVE: Capabilities = Capabilities {
        transform: true,
        text_matrix: true,
    };

    pub fn has(&self, primitive: Primitive) -> bool {
        match primitive {
            Primitive::Transform => self.transform,
            Primitive::TextMatrix => self.text_matrix,
        }
    }
}

/// 绘图指令流
pub trait ContentStream {
    /// 默认没有任何可选原语
    fn capabilities(&self) -> Capabilities {
        Capabilities::default()
    }

    /// `cm`
    fn set_matrix(&mut self, m: Matrix);

    /// `Tm`
    fn set_text_matrix(&mut self, m: Matrix);

    fn transform(&mut self, _m: Matrix) -> Result<(), RenderError> {
        Err(RenderError::MissingPrimitive {
            primitive: Primitive::Transform.name(),
        })
    }

    fn text_matrix(&mut self, _m: Matrix) -> Result<(), RenderError> {
        Err(RenderError::MissingPrimitive {
            primitive: Primitive::TextMatrix.name(),
        })
    }
}

/// 把指令记录为文本行的指令流
#[derive(Debug, Clone, Default)]
pub struct OpStream {
    ops: Vec<String>,
    caps: Capabilities,
}

impl OpStream {
    /// 只有基础指令
    pub fn legacy() -> Self {
        Self::default()
    }

    /// 原生提供所有原语
    pub fn modern() -> Self {
        Self {
            ops: Vec::new(),
            caps: Capabilities::NATIVE,
        }
    }

    pub fn ops(&self) -> &[String] {
        &self.ops
    }
}

impl ContentStream for OpStream {
    fn capabilities(&self) -> Capabilities {
        self.caps
    }

    fn set_matrix(&mut self, m: Matrix) {
        self.ops.push(format!("{} cm", m));
    }

    fn set_text_matrix(&mut self, m: Matrix) {
        self.ops.push(format!("{} Tm", m));
    }

    fn transform(&mut self, m: Matrix) -> Result<(), RenderError> {
        if !self.caps.transform {
            return Err(RenderError::MissingPrimitive {
                primitive: Primitive::Transform.name(),
            });
        }
        self.set_matrix(m);
        Ok(())
    }

    fn text_matrix(&mut self, m: Matrix) -> Result<(), RenderError> {
        if !self.caps.text_matrix {
            return Err(RenderError::MissingPrimitive {
                primitive: Primitive::TextMatrix.name(),
            });
        }
        self.set_text_matrix(m);
        Ok(())
    }
}
