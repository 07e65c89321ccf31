//! Result formatting

use clap::ValueEnum;

use oems_core::Element;

/// Separator between printed elements
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum Separator {
    /// One value per line
    #[default]
    Newline,
    /// All values on one line
    Space,
}

impl Separator {
    pub fn as_str(self) -> &'static str {
        match self {
            Separator::Newline => "\n",
            Separator::Space => " ",
        }
    }
}

/// How a finished run is printed
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OutputFormat {
    /// Separator for the sorted values
    pub separator: Separator,
    /// Print the unsorted input (space separated) first
    pub echo_input: bool,
}

impl Default for OutputFormat {
    fn default() -> Self {
        OutputFormat {
            separator: Separator::Newline,
            echo_input: true,
        }
    }
}

impl OutputFormat {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_separator(mut self, separator: Separator) -> Self {
        self.separator = separator;
        self
    }

    pub fn with_echo(mut self, echo_input: bool) -> Self {
        self.echo_input = echo_input;
        self
    }

    /// Full stdout text for a run
    pub fn render(&self, input: &[Element], sorted: &[Element]) -> String {
        let mut out = String::new();
        if self.echo_input {
            out.push_str(&format_elements(input, Separator::Space));
        }
        out.push_str(&format_elements(sorted, self.separator));
        out
    }
}

/// Values as decimal integers, newline terminated
pub fn format_elements(elements: &[Element], separator: Separator) -> String {
    let mut line = elements
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(separator.as_str());
    line.push('\n');
    line
}
