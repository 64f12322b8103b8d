use std::path::PathBuf;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    log::info!("Vitrine viewer (headless session)");
    log::info!("   Usage: vitrine [settings.json]");

    let settings_path = std::env::args_os().nth(1).map(PathBuf::from);
    if let Err(err) = vitrine::app::run(settings_path) {
        log::error!("{}", err);
        std::process::exit(1);
    }

    log::info!("Goodbye!");
}
