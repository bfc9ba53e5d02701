//! 原语兼容层
//!
//! 指令流缺少 `transform` / `text_matrix` 时，用 `set_matrix` / `set_text_matrix`
//! 以相同的参数代替。安装前先检查能力，重复安装不改变已有绑定，原生原语不会被替换。

use tracing::debug;

use crate::error::RenderError;
use crate::render::stream::{Capabilities, ContentStream, Matrix, Primitive};

/// 原语的绑定方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    Native,
    Shim,
}

#[derive(Debug, Clone, Default)]
pub struct CompatLayer {
    transform: Option<Binding>,
    text_matrix: Option<Binding>,
}

impl CompatLayer {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot_mut(&mut self, primitive: Primitive) -> &mut Option<Binding> {
        match primitive {
            Primitive::Transform => &mut self.transform,
            Primitive::TextMatrix => &mut self.text_matrix,
        }
    }

    pub fn binding(&self, primitive: Primitive) -> Option<Binding> {
        match primitive {
            Primitive::Transform => self.transform,
            Primitive::TextMatrix => self.text_matrix,
        }
    }

    /// 按能力绑定尚未绑定的原语，返回本次新安装的替代原语
    pub fn install(&mut self, caps: Capabilities) -> Vec<Primitive> {
        let mut shimmed = Vec::new();
        for primitive in Primitive::ALL {
            let slot = self.slot_mut(primitive);
            if slot.is_some() {
                continue;
            }
            if caps.has(primitive) {
                debug!("原语 {} 由指令流原生提供", primitive);
                *slot = Some(Binding::Native);
            } else {
                *slot = Some(Binding::Shim);
                shimmed.push(primitive);
            }
        }
        shimmed
    }

    /// 当前使用替代实现的原语
    pub fn shims(&self) -> Vec<Primitive> {
        Primitive::ALL
            .into_iter()
            .filter(|p| self.binding(*p) == Some(Binding::Shim))
            .collect()
    }

    pub fn transform<S: ContentStream + ?Sized>(&self, stream: &mut S, m: Matrix) -> Result<(), RenderError> {
        match self.transform {
            Some(Binding::Native) => stream.transform(m),
            Some(Binding::Shim) => {
                stream.set_matrix(m);
                Ok(())
            }
            None => Err(RenderError::NotInstalled {
                primitive: Primitive::Transform.name(),
            }),
        }
    }

    pub fn text_matrix<S: ContentStream + ?Sized>(&self, stream: &mut S, m: Matrix) -> Result<(), RenderError> {
        match self.text_matrix {
            Some(Binding::Native) => stream.text_matrix(m),
            Some(Binding::Shim) => {
                stream.set_text_matrix(m);
                Ok(())
            }
            None => Err(RenderError::NotInstalled {
                primitive: Primitive::TextMatrix.name(),
            }),
        }
    }
}
