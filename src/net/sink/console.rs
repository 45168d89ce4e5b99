use crate::net::InputMode;
use crate::net::output::OutFrame;
use crate::net::sink::ClientSink;
use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

pub struct ConsoleSink<W> {
    writer: W,
    hidden: bool,
}

impl<W> ConsoleSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, hidden: false }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[async_trait]
impl<W> ClientSink for ConsoleSink<W>
where
    W: AsyncWriteExt + Unpin + Send,
{
    async fn send_frame(&mut self, frame: OutFrame) -> anyhow::Result<()> {
        match frame {
            OutFrame::Line(s) => {
                self.writer.write_all(s.as_bytes()).await?;
                self.writer.write_all(b"\n").await?;
            }
            OutFrame::System(s) => {
                self.writer.write_all(b"\x1b[33m").await?; // yellow
                self.writer.write_all(s.as_bytes()).await?;
                self.writer.write_all(b"\x1b[0m\n").await?;
            }
            OutFrame::Prompt(p) => {
                self.writer.write_all(p.as_bytes()).await?;
                if !p.ends_with(' ') {
                    self.writer.write_all(b" ").await?;
                }
            }
            OutFrame::InputMode(InputMode::Normal) => {
                if self.hidden {
                    // conceal off
                    self.writer.write_all(b"\x1b[28m").await?;
                    self.hidden = false;
                }
            }
            OutFrame::InputMode(InputMode::Hidden(_)) => {
                // a local terminal cannot mask per character; conceal the echo instead
                self.writer.write_all(b"\x1b[8m").await?;
                self.hidden = true;
            }
        }

        self.writer.flush().await?;
        Ok(())
    }
}
