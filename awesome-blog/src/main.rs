use std::path::PathBuf;

use awesome_blog::Config;

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let path = std::env::args_os().nth(1).map(PathBuf::from);
    let config = match Config::load(path.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = awesome_blog::run(config).await {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
