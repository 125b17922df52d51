/// Line-oriented destination for human-readable output.
pub trait OutputSink {
    fn line(&mut self, text: &str);
}

/// Writes every line to standard output.
#[derive(Debug, Default)]
pub struct ConsoleSink;

impl OutputSink for ConsoleSink {
    fn line(&mut self, text: &str) {
        println!("{}", text);
    }
}

/// Collects lines in memory.
impl OutputSink for Vec<String> {
    fn line(&mut self, text: &str) {
        self.push(text.to_string());
    }
}
