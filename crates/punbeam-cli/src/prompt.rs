use anyhow::Result;
use punbeam::models::message::Message;
use punbeam::models::response::ResponseFormat;

pub mod cliclack;

pub trait Prompt {
    fn render(&mut self, message: Box<Message>);
    fn render_response(&mut self, response: &ResponseFormat);
    fn get_input(&mut self) -> Result<Input>;
    fn show_busy(&self);
    fn hide_busy(&self);
    fn close(&self);
}

pub struct Input {
    pub input_type: InputType,
    // Optional content as sometimes the user may be issuing a command eg. (Exit)
    pub content: Option<String>,
}

pub enum InputType {
    AskAgain, // Ask the user for input again. Control flow command.
    Message,  // User sent a message
    Exit,     // User wants to exit the session
}

pub enum Theme {
    Light,
    Dark,
}
