use anyhow::Result;
use workbook_builder::utils::logging;
use workbook_builder::{App, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置（默认值 < workbook.toml < 环境变量）
    let config = Config::load()?;

    // 初始化日志
    logging::init(config.verbose_logging);

    // 初始化并运行应用
    App::initialize(config).await?.run().await
}
