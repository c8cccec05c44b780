use anyhow::Result;
use futures::StreamExt;

use crate::prompt::{InputType, Prompt};
use punbeam::agent::{Agent, ReplyEvent};
use punbeam::models::message::Message;
use punbeam::models::response::Context;

pub struct Session<'a> {
    agent: Box<Agent>,
    prompt: Box<dyn Prompt + 'a>,
    context: Context,
    thread_id: String,
}

impl<'a> Session<'a> {
    pub fn new(
        agent: Box<Agent>,
        prompt: Box<impl Prompt + 'a>,
        context: Context,
        thread_id: String,
    ) -> Self {
        Session {
            agent,
            prompt,
            context,
            thread_id,
        }
    }

    /// Run the conversation loop until the user exits.
    ///
    /// The exit keyword terminates before any model call; every other input
    /// results in exactly one agent invocation for that turn.
    pub async fn start(&mut self) -> Result<()> {
        loop {
            let input = self.prompt.get_input()?;
            let content = match input.input_type {
                InputType::Message => match input.content {
                    Some(content) => content,
                    None => continue,
                },
                InputType::Exit => break,
                InputType::AskAgain => continue,
            };

            self.prompt.show_busy();
            self.process_turn(&content).await;
            self.prompt.hide_busy();
        }
        self.prompt.close();
        Ok(())
    }

    async fn process_turn(&mut self, content: &str) {
        let message = Message::user().with_text(content);
        let mut stream = match self
            .agent
            .reply(&self.thread_id, message, &self.context)
            .await
        {
            Ok(stream) => stream,
            Err(e) => {
                eprintln!("Error starting reply stream: {}", e);
                return;
            }
        };

        while let Some(event) = stream.next().await {
            match event {
                Ok(ReplyEvent::Message(message)) => {
                    self.prompt.render(Box::new(message));
                }
                Ok(ReplyEvent::Response(response)) => {
                    self.prompt.render_response(&response);
                }
                Err(e) => {
                    eprintln!("Error: {}", e);
                    break;
                }
            }
        }
    }
}
