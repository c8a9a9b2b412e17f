//! Main entry point for the pizza order application.
//!
//! Runs the order form in the terminal, prints the markup of a route, or
//! serves the local order API the form posts to.

use clap::{Parser, Subcommand};
use pizza_config::Config;
use pizza_core::{AppBuilder, LandingView, OrderForm};
use pizza_service::{host, server};
use pizza_types::{OrderSchema, Route};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::BufReader;

/// Command-line arguments for the pizza order application.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file
	#[arg(short, long, default_value = "config.toml")]
	config: PathBuf,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info")]
	log_level: String,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Command {
	/// Drive the application from the terminal
	Run,
	/// Print the initial HTML of a route (`/` or `/order`)
	Render {
		#[arg(default_value = "/")]
		route: String,
	},
	/// Serve the local order API
	MockApi,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	use tracing_subscriber::{fmt, EnvFilter};

	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

	// stdout belongs to the terminal host
	fmt()
		.with_env_filter(env_filter)
		.with_writer(std::io::stderr)
		.with_thread_ids(true)
		.with_target(true)
		.init();

	let config_path = args
		.config
		.to_str()
		.ok_or("Config path is not valid UTF-8")?;
	let config = Config::from_file_or_default(config_path).await?;

	match args.command {
		Command::Run => {
			let (app, handle) = AppBuilder::new(config).build()?;
			let task = app.spawn();
			host::run(
				handle,
				BufReader::new(tokio::io::stdin()),
				tokio::io::stdout(),
			)
			.await?;
			task.await?;
		},
		Command::Render { route } => {
			let route: Route = route.parse()?;
			println!("{}", render(&config, route));
		},
		Command::MockApi => {
			server::start_server(config.api_or_default()).await?;
		},
	}

	Ok(())
}

/// Renders the initial markup of a route.
fn render(config: &Config, route: Route) -> String {
	match route {
		Route::Home => LandingView::new(&config.ui).to_html(),
		Route::Order => OrderForm::new(Arc::new(OrderSchema::new())).to_html(),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_args_default_values() {
		let args = Args::parse_from(["pizza", "run"]);

		assert_eq!(args.config, PathBuf::from("config.toml"));
		assert_eq!(args.log_level, "info");
		assert_eq!(args.command, Command::Run);
	}

	#[test]
	fn test_args_custom_values() {
		let args = Args::parse_from([
			"pizza",
			"--config",
			"custom.toml",
			"-l",
			"debug",
			"render",
			"/order",
		]);

		assert_eq!(args.config, PathBuf::from("custom.toml"));
		assert_eq!(args.log_level, "debug");
		assert_eq!(
			args.command,
			Command::Render {
				route: "/order".into()
			}
		);
	}

	#[test]
	fn test_render_routes() {
		let config = Config::default();

		let landing = render(&config, Route::Home);
		assert!(landing.contains("alt=\"order-pizza\""));

		let form = render(&config, Route::Order);
		assert!(form.contains("<h2>Order Your Pizza</h2>"));
		assert!(form.contains("placeholder=\"Type full name\""));
		assert!(form.contains(">FullName</label>"));
		assert!(form.contains("type=\"submit\""));
		assert!(form.contains("disabled"));
	}
}
