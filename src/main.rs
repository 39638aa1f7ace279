// ==========================================
// GEEstor 维护计划 - 命令行主入口
// ==========================================

use clap::Parser;
use geestor_plan::cli::{self, Cli};
use geestor_plan::logging::{self, LogFormat};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let format = if cli.log_json {
        LogFormat::Json
    } else {
        LogFormat::Text
    };
    logging::init_with_format(format, "warn");

    tracing::debug!(version = geestor_plan::VERSION, "{}", geestor_plan::APP_NAME);
    cli::run(cli)
}
