use bunner_ctx_rs::{Connection, Response};
use std::io;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Flushed { status: u16, body: String },
    Closed,
}

/// Connection double that records what the dispatcher did to it.
#[derive(Clone, Default)]
pub struct RecordingConnection {
    events: Arc<Mutex<Vec<Event>>>,
}

impl RecordingConnection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }
}

impl Connection for RecordingConnection {
    fn force_close(&mut self) {
        self.events.lock().unwrap().push(Event::Closed);
    }

    fn flush(&mut self, response: &Response) -> io::Result<()> {
        self.events.lock().unwrap().push(Event::Flushed {
            status: response.status(),
            body: String::from_utf8_lossy(response.body()).into_owned(),
        });
        Ok(())
    }
}
