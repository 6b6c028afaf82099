mod app;

use std::process::ExitCode;

use tracing::error;

fn main() -> ExitCode {
    let Some(app) = app::bootstrap::build_app(std::env::args()) else {
        error!("usage: tilemove_sandbox <scenario.json>");
        return ExitCode::FAILURE;
    };
    app::runner::run(app)
}
