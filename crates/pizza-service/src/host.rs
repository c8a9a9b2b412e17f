//! Line-oriented terminal host.
//!
//! Reads one command per line, turns it into a UI event, waits for the
//! application to settle and prints the current view as text.

use pizza_core::{AppError, AppHandle, AppSnapshot};
use pizza_types::{PizzaSize, Route, UiEvent};
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

const HELP: &str = "\
Commands:
  click           click the landing image
  home            go back to the landing page
  name <text>     type a full name
  size [S|M|L]    choose a size, or clear it
  check <id>      check a topping
  uncheck <id>    uncheck a topping
  submit          submit the order
  show            print the current view
  html            print the current view as HTML
  help            print this help
  quit            exit";

/// Errors that end a host session.
#[derive(Debug, Error)]
pub enum HostError {
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	#[error("Application error: {0}")]
	App(#[from] AppError),
}

/// A parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
	Ui(UiEvent),
	Show,
	Html,
	Help,
	Quit,
}

/// Parses one input line. Blank lines yield `None`.
pub fn parse_command(line: &str) -> Result<Option<Command>, String> {
	let line = line.trim();
	if line.is_empty() {
		return Ok(None);
	}
	let (word, rest) = match line.split_once(char::is_whitespace) {
		Some((word, rest)) => (word, rest.trim()),
		None => (line, ""),
	};

	let command = match word {
		"click" => Command::Ui(UiEvent::ImageClicked),
		"home" => Command::Ui(UiEvent::Navigate(Route::Home)),
		"name" => Command::Ui(UiEvent::NameChanged(rest.to_string())),
		"size" if rest.is_empty() => Command::Ui(UiEvent::SizeChanged(String::new())),
		"size" => {
			let size: PizzaSize = rest.parse()?;
			Command::Ui(UiEvent::SizeChanged(size.code().to_string()))
		},
		"check" | "uncheck" if rest.is_empty() => {
			return Err(format!("Usage: {} <topping id>", word));
		},
		"check" => Command::Ui(UiEvent::ToppingToggled {
			id: rest.to_string(),
			checked: true,
		}),
		"uncheck" => Command::Ui(UiEvent::ToppingToggled {
			id: rest.to_string(),
			checked: false,
		}),
		"submit" => Command::Ui(UiEvent::SubmitClicked),
		"show" => Command::Show,
		"html" => Command::Html,
		"help" => Command::Help,
		"quit" | "exit" => Command::Quit,
		other => return Err(format!("Unknown command: {} (try 'help')", other)),
	};
	Ok(Some(command))
}

fn screen(snapshot: &AppSnapshot) -> String {
	format!("--- {} ---\n{}\n", snapshot.route, snapshot.view.to_text())
}

/// Runs a session until `quit` or end of input, then stops the application.
pub async fn run<R, W>(mut handle: AppHandle, input: R, mut output: W) -> Result<(), HostError>
where
	R: AsyncBufRead + Unpin,
	W: AsyncWrite + Unpin,
{
	output
		.write_all(screen(&handle.snapshot()).as_bytes())
		.await?;

	let mut lines = input.lines();
	while let Some(line) = lines.next_line().await? {
		let text = match parse_command(&line) {
			Ok(None) => continue,
			Ok(Some(Command::Quit)) => break,
			Ok(Some(Command::Help)) => format!("{}\n", HELP),
			Ok(Some(Command::Show)) => screen(&handle.snapshot()),
			Ok(Some(Command::Html)) => format!("{}\n", handle.snapshot().html),
			Ok(Some(Command::Ui(event))) => {
				tracing::debug!(?event, "Sending event");
				handle.send(event)?;
				screen(&handle.settle().await?)
			},
			Err(message) => format!("error: {}\n", message),
		};
		output.write_all(text.as_bytes()).await?;
		output.flush().await?;
	}

	handle.shutdown().ok();
	Ok(())
}
