use anyhow::Result;
use bat::WrappingMode;
use cliclack::{input, spinner};
use console::style;
use punbeam::models::message::{Message, MessageContent};
use punbeam::models::response::ResponseFormat;

use super::{Input, InputType, Prompt, Theme};

pub struct CliclackPrompt {
    spinner: cliclack::ProgressBar,
    theme: Theme,
}

impl CliclackPrompt {
    pub fn new() -> Self {
        CliclackPrompt {
            spinner: spinner(),
            theme: Theme::Dark,
        }
    }
}

impl Default for CliclackPrompt {
    fn default() -> Self {
        Self::new()
    }
}

fn print_tool_request(content: &str, theme: &str, tool_name: &str) {
    bat::PrettyPrinter::new()
        .input(
            bat::Input::from_bytes(content.as_bytes()).name(format!("Tool Request: {}", tool_name)),
        )
        .theme(theme)
        .language("JSON")
        .grid(true)
        .header(true)
        .wrapping_mode(WrappingMode::Character)
        .print()
        .unwrap_or_default();
}

fn print_tool_response(content: &str, theme: &str, language: &str) {
    bat::PrettyPrinter::new()
        .input(bat::Input::from_bytes(content.as_bytes()).name("Tool Response:"))
        .theme(theme)
        .language(language)
        .grid(true)
        .header(true)
        .wrapping_mode(WrappingMode::Character)
        .print()
        .unwrap_or_default();
}

fn print(content: &str, theme: &str) {
    bat::PrettyPrinter::new()
        .input(bat::Input::from_bytes(content.as_bytes()))
        .theme(theme)
        .language("Markdown")
        .wrapping_mode(WrappingMode::Character)
        .print()
        .unwrap_or_default();
}

impl Prompt for CliclackPrompt {
    fn render(&mut self, message: Box<Message>) {
        let theme = match self.theme {
            Theme::Light => "GitHub",
            Theme::Dark => "zenburn",
        };

        for message_content in &message.content {
            match message_content {
                MessageContent::Text(text) => print(&text.text, theme),
                MessageContent::ToolRequest(tool_request) => match &tool_request.tool_call {
                    Ok(call) => {
                        let arguments = serde_json::to_string_pretty(&call.arguments)
                            .unwrap_or_else(|_| call.arguments.to_string());
                        print_tool_request(&arguments, theme, &call.name);
                    }
                    Err(e) => print(&e.to_string(), theme),
                },
                MessageContent::ToolResponse(tool_response) => match &tool_response.tool_result {
                    Ok(output) => {
                        let texts: Vec<&str> =
                            output.iter().filter_map(|c| c.as_text()).collect();
                        let formatted = texts.join("\n");
                        let language = if formatted.starts_with('{') || formatted.starts_with('[')
                        {
                            "JSON"
                        } else {
                            "Markdown"
                        };
                        print_tool_response(&formatted, theme, language);
                    }
                    Err(e) => print(&e.to_string(), theme),
                },
            }
        }
        println!();
    }

    fn render_response(&mut self, response: &ResponseFormat) {
        println!("{}", style(response.display_content()).bold());
        println!();
    }

    fn get_input(&mut self) -> Result<Input> {
        let text: String = input("Message:").placeholder("").interact()?;

        if text.trim().is_empty() {
            return Ok(Input {
                input_type: InputType::AskAgain,
                content: None,
            });
        }

        // The literal exit keyword terminates the loop, any letter case
        if text.trim().eq_ignore_ascii_case("exit") {
            return Ok(Input {
                input_type: InputType::Exit,
                content: None,
            });
        }

        Ok(Input {
            input_type: InputType::Message,
            content: Some(text),
        })
    }

    fn show_busy(&self) {
        self.spinner.start("awaiting reply");
    }

    fn hide_busy(&self) {
        self.spinner.stop("");
    }

    fn close(&self) {
        println!("Exiting the weather forecast agent. Goodbye!");
    }
}
