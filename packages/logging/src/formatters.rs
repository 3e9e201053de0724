use crate::{Direction, FormattedString, LogFormatter, LogInfo, Loglevel, WithColor};
use termcolor::{Color, ColorSpec};

#[derive(Default)]
pub struct DefaultFormatter {
    cs_timestamp: ColorSpec,
    cs_label: ColorSpec,
    cs_tags: ColorSpec,

    cs_text_error: ColorSpec,
    cs_text_warning: ColorSpec,
}

impl DefaultFormatter {
    pub fn new() -> Self {
        let mut cs_timestamp = ColorSpec::default();
        cs_timestamp.set_dimmed(true);

        let mut cs_label = ColorSpec::default();
        cs_label.set_bold(true);

        let mut cs_tags = ColorSpec::default();
        cs_tags.set_fg(Some(Color::Cyan));

        let mut cs_text_error = ColorSpec::default();
        cs_text_error.set_fg(Some(Color::Red));

        let mut cs_text_warning = ColorSpec::default();
        cs_text_warning.set_fg(Some(Color::Yellow));

        Self {
            cs_timestamp,
            cs_label,
            cs_tags,
            cs_text_error,
            cs_text_warning,
        }
    }

    fn text_color(&self, level: Loglevel) -> Option<ColorSpec> {
        match level {
            Loglevel::Error => Some(self.cs_text_error.clone()),
            Loglevel::Warn => Some(self.cs_text_warning.clone()),
            _ => None,
        }
    }
}

impl LogFormatter for DefaultFormatter {
    fn format_log(&self, log: &LogInfo, level: Loglevel) -> Vec<FormattedString> {
        let mut output: Vec<FormattedString> = Vec::new();

        let timestamp = log.timestamp.format("%H:%M:%S%.3f").to_string();
        output.push(timestamp.with_color(self.cs_timestamp.clone()));
        output.push(" ".into());
        output.push(log.label.with_color(self.cs_label.clone()));

        let direction = match log.direction {
            Direction::Inbound => " « ",
            Direction::Outbound => " » ",
            Direction::None => "   ",
        };
        output.push(direction.into());

        if let Some(tags) = &log.primary_tags {
            for tag in tags {
                output.push(format!("[{}] ", tag).with_color(self.cs_tags.clone()));
            }
        }

        let text_color = self.text_color(level);
        for (i, line) in log.payload.lines.iter().enumerate() {
            if i > 0 {
                // Align continuation lines under the first payload character
                output.push("\n                      ".into());
            }
            output.push(FormattedString::new(line.clone(), text_color.clone()));
        }

        if let Some(tag) = &log.secondary_tag {
            output.push(format!(" ({})", tag).with_color(self.cs_tags.clone()));
        }

        output.push("\n".into());
        output
    }
}
