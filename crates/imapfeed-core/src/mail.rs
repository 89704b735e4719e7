//! Message content extraction and HTML display.

use mailparse::{DispositionType, MailHeaderMap, ParsedMail, parse_mail};

/// Text and HTML bodies of a parsed message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MailContent {
    /// Decoded `Subject` header.
    pub subject: Option<String>,
    /// First `text/plain` body outside attachments.
    pub text: Option<String>,
    /// First `text/html` body outside attachments.
    pub html: Option<String>,
}

impl MailContent {
    /// Parse a raw RFC 5322 message.
    ///
    /// Multipart messages are walked depth-first; bodies are decoded from
    /// their transfer encoding and charset.
    ///
    /// # Errors
    ///
    /// Returns an error if the message or one of its bodies cannot be parsed.
    pub fn parse(raw: &[u8]) -> crate::Result<Self> {
        let parsed = parse_mail(raw)?;
        let mut content = Self {
            subject: parsed.headers.get_first_value("Subject"),
            ..Self::default()
        };
        content.collect_bodies(&parsed)?;
        Ok(content)
    }

    fn collect_bodies(&mut self, part: &ParsedMail<'_>) -> crate::Result<()> {
        if matches!(
            part.get_content_disposition().disposition,
            DispositionType::Attachment
        ) {
            return Ok(());
        }
        if !part.subparts.is_empty() {
            for sub in &part.subparts {
                self.collect_bodies(sub)?;
            }
            return Ok(());
        }

        match part.ctype.mimetype.to_ascii_lowercase().as_str() {
            "text/html" if self.html.is_none() => self.html = Some(part.get_body()?),
            "text/plain" if self.text.is_none() => self.text = Some(part.get_body()?),
            _ => {}
        }
        Ok(())
    }

    /// HTML for displaying the message.
    ///
    /// The HTML body when there is a non-empty one, otherwise the escaped text
    /// body in a "Text Only Mail" page.
    #[must_use]
    pub fn html_display(&self) -> String {
        match &self.html {
            Some(html) if !html.is_empty() => html.clone(),
            _ => format!(
                "<html><body><b>Text Only Mail</b><pre>{}</pre></body></html>",
                escape_html(self.text.as_deref().unwrap_or_default())
            ),
        }
    }
}

/// Escape text for inclusion in HTML element content or attribute values.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const PLAIN: &str = concat!(
        "From: alice@example.com\r\n",
        "Subject: Lunch\r\n",
        "Content-Type: text/plain; charset=utf-8\r\n",
        "\r\n",
        "Meet at <noon> & bring \"snacks\"\r\n",
    );

    const ALTERNATIVE: &str = concat!(
        "Subject: Report\r\n",
        "MIME-Version: 1.0\r\n",
        "Content-Type: multipart/alternative; boundary=\"b1\"\r\n",
        "\r\n",
        "--b1\r\n",
        "Content-Type: text/plain; charset=utf-8\r\n",
        "\r\n",
        "Plain report\r\n",
        "--b1\r\n",
        "Content-Type: text/html; charset=utf-8\r\n",
        "\r\n",
        "<p>Rich report</p>\r\n",
        "--b1--\r\n",
    );

    const WITH_ATTACHMENT: &str = concat!(
        "Subject: Invoice\r\n",
        "MIME-Version: 1.0\r\n",
        "Content-Type: multipart/mixed; boundary=\"outer\"\r\n",
        "\r\n",
        "--outer\r\n",
        "Content-Type: text/plain\r\n",
        "\r\n",
        "See attached\r\n",
        "--outer\r\n",
        "Content-Type: text/html\r\n",
        "Content-Disposition: attachment; filename=\"invoice.html\"\r\n",
        "\r\n",
        "<p>Invoice</p>\r\n",
        "--outer--\r\n",
    );

    #[test]
    fn plain_message_has_text_only() {
        let content = MailContent::parse(PLAIN.as_bytes()).unwrap();
        assert_eq!(content.subject.as_deref(), Some("Lunch"));
        assert!(content.text.unwrap().contains("Meet at"));
        assert!(content.html.is_none());
    }

    #[test]
    fn text_only_mail_is_escaped_in_pre() {
        let content = MailContent::parse(PLAIN.as_bytes()).unwrap();
        let html = content.html_display();

        assert!(html.starts_with("<html><body><b>Text Only Mail</b><pre>"));
        assert!(html.ends_with("</pre></body></html>"));
        assert!(html.contains("Meet at &lt;noon&gt; &amp; bring &quot;snacks&quot;"));
        assert!(!html.contains("<noon>"));
    }

    #[test]
    fn html_body_is_preferred() {
        let content = MailContent::parse(ALTERNATIVE.as_bytes()).unwrap();
        assert!(content.text.as_deref().unwrap().contains("Plain report"));
        assert!(content.html_display().contains("<p>Rich report</p>"));
        assert!(!content.html_display().contains("Text Only Mail"));
    }

    #[test]
    fn attachments_are_not_bodies() {
        let content = MailContent::parse(WITH_ATTACHMENT.as_bytes()).unwrap();
        assert!(content.html.is_none());
        assert!(content.html_display().contains("See attached"));
    }

    #[test]
    fn empty_html_falls_back_to_text() {
        let content = MailContent {
            subject: None,
            text: Some("hi".to_string()),
            html: Some(String::new()),
        };
        assert_eq!(
            content.html_display(),
            "<html><body><b>Text Only Mail</b><pre>hi</pre></body></html>"
        );
    }

    #[test]
    fn message_without_bodies_displays_empty_page() {
        let content = MailContent::default();
        assert_eq!(
            content.html_display(),
            "<html><body><b>Text Only Mail</b><pre></pre></body></html>"
        );
    }

    #[test]
    fn escapes_quotes_and_ampersands() {
        assert_eq!(escape_html(r#"a&b<'c'>"d""#), "a&amp;b&lt;&#x27;c&#x27;&gt;&quot;d&quot;");
    }
}
