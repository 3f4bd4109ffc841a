//! Streaming XMLTV document writer
//!
//! Elements are rendered line by line with `quick_xml` escaping and written
//! through a buffered async sink, so channels and programmes never have to be
//! held in memory together.

use quick_xml::escape::escape;
use tokio::io::{AsyncWrite, AsyncWriteExt, BufWriter};

use crate::errors::AppResult;
use crate::models::{Channel, Programme};

/// Fixed `source-info-name` of generated documents
pub const SOURCE_INFO_NAME: &str = "tvtv2xmltv";

/// Attributes of the root `tv` element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentHeader {
    /// Run timestamp, `yyyy-MM-ddTHH:mm:ss.fffZ`
    pub date: String,
    pub source_info_url: String,
    pub source_info_name: String,
}

/// Render the XML declaration, doctype and opening `tv` element
pub fn render_header(header: &DocumentHeader) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <!DOCTYPE tv SYSTEM \"xmltv.dtd\">\n\
         <tv date=\"{}\" source-info-url=\"{}\" source-info-name=\"{}\">\n",
        escape(header.date.as_str()),
        escape(header.source_info_url.as_str()),
        escape(header.source_info_name.as_str())
    )
}

pub fn render_channel(channel: &Channel) -> String {
    let mut channel_line = format!("  <channel id=\"{}\">\n", escape(channel.id.as_str()));

    for display_name in &channel.display_names {
        channel_line.push_str(&format!(
            "    <display-name>{}</display-name>\n",
            escape(display_name.as_str())
        ));
    }

    if let Some(ref icon_url) = channel.icon_url {
        channel_line.push_str(&format!("    <icon src=\"{}\" />\n", escape(icon_url.as_str())));
    }

    channel_line.push_str("  </channel>\n");
    channel_line
}

/// Render one `programme` element
///
/// Child order is fixed: title, sub-title, categories, video, audio, new.
/// The `channel` attribute is left out when the lineup record had no
/// channel number.
pub fn render_programme(programme: &Programme, channel_id: Option<&str>) -> String {
    let mut program_line = format!(
        "  <programme start=\"{}\" stop=\"{}\" duration=\"{}\"",
        programme.xmltv_start(),
        programme.xmltv_stop(),
        escape(programme.duration.as_str())
    );
    if let Some(channel_id) = channel_id {
        program_line.push_str(&format!(" channel=\"{}\"", escape(channel_id)));
    }
    program_line.push_str(">\n");

    program_line.push_str(&format!(
        "    <title>{}</title>\n",
        escape(programme.title.as_str())
    ));
    program_line.push_str(&format!(
        "    <sub-title>{}</sub-title>\n",
        escape(programme.subtitle.as_str())
    ));

    for category in &programme.categories {
        program_line.push_str(&format!("    <category>{}</category>\n", category));
    }

    if programme.is_hd {
        program_line.push_str("    <video>\n      <quality>HDTV</quality>\n    </video>\n");
    }
    if programme.is_stereo {
        program_line.push_str("    <audio>\n      <stereo>stereo</stereo>\n    </audio>\n");
    }
    if programme.is_new {
        program_line.push_str("    <new />\n");
    }

    program_line.push_str("  </programme>\n");
    program_line
}

/// Buffered XMLTV writer over an async sink
pub struct XmltvWriter<W: AsyncWrite + Unpin> {
    writer: BufWriter<W>,
    bytes_written: u64,
}

impl<W: AsyncWrite + Unpin> XmltvWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            writer: BufWriter::new(inner),
            bytes_written: 0,
        }
    }

    async fn write_str(&mut self, content: &str) -> AppResult<()> {
        self.writer.write_all(content.as_bytes()).await?;
        self.bytes_written += content.len() as u64;
        Ok(())
    }

    pub async fn write_header(&mut self, header: &DocumentHeader) -> AppResult<()> {
        self.write_str(&render_header(header)).await
    }

    pub async fn write_channel(&mut self, channel: &Channel) -> AppResult<()> {
        self.write_str(&render_channel(channel)).await
    }

    pub async fn write_programme(
        &mut self,
        programme: &Programme,
        channel_id: Option<&str>,
    ) -> AppResult<()> {
        self.write_str(&render_programme(programme, channel_id)).await
    }

    /// Close the root element, flush, and hand back the sink
    pub async fn finish(mut self) -> AppResult<(W, u64)> {
        self.write_str("</tv>\n").await?;
        self.writer.flush().await?;
        Ok((self.writer.into_inner(), self.bytes_written))
    }
}
