use env_logger::Env;
use log::debug;

pub const LOG_ENV: &str = "MONTHLY_WIDGET_LOG";

pub fn init_logging() {
	env_logger::Builder::from_env(Env::default().filter_or(LOG_ENV, "warn"))
		.format_timestamp_millis()
		.format_target(true)
		.init();

	debug!("logging initialized");
}
