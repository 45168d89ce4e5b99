use crate::net::InputMode;
use crate::net::sink::ClientSink;
use tokio::sync::mpsc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutFrame {
    /// Reply text
    Line(String),
    /// Notice from the shell itself (errors, session changes)
    System(String),
    /// Prompt line, written without a newline
    Prompt(String),
    /// Switch echo on or off for the next input
    InputMode(InputMode),
}

#[derive(Clone, Debug)]
pub struct OutputHandle {
    tx: mpsc::Sender<OutFrame>,
}

impl OutputHandle {
    pub fn new(tx: mpsc::Sender<OutFrame>) -> Self {
        Self { tx }
    }

    /// Handle plus the receiving end, for callers that drain frames themselves.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<OutFrame>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self::new(tx), rx)
    }

    pub async fn line(&self, s: impl Into<String>) {
        let _ = self.tx.send(OutFrame::Line(s.into())).await;
    }

    pub async fn system(&self, s: impl Into<String>) {
        let _ = self.tx.send(OutFrame::System(s.into())).await;
    }

    pub async fn prompt(&self, s: impl Into<String>) {
        let _ = self.tx.send(OutFrame::Prompt(s.into())).await;
    }

    pub async fn input_mode(&self, mode: InputMode) {
        let _ = self.tx.send(OutFrame::InputMode(mode)).await;
    }
}

pub struct SessionOut {
    rx: mpsc::Receiver<OutFrame>,
}

impl SessionOut {
    pub fn new(rx: mpsc::Receiver<OutFrame>) -> Self {
        Self { rx }
    }

    pub async fn run<C>(mut self, mut client: C) -> anyhow::Result<()>
    where
        C: ClientSink,
    {
        while let Some(frame) = self.rx.recv().await {
            client.send_frame(frame).await?;
        }

        Ok(())
    }
}
