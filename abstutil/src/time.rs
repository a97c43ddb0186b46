use std::time::Instant;

pub fn elapsed_seconds(since: Instant) -> f64 {
    let dt = since.elapsed();
    (dt.as_secs() as f64) + (f64::from(dt.subsec_nanos()) * 1e-9)
}

pub fn prettyprint_time(seconds: f64) -> String {
    format!("{:.4}s", seconds)
}

struct TimerSpan {
    name: String,
    started_at: Instant,
    nested_results: Vec<String>,
    nested_time: f64,
}

/// Profiles long-running phases. Spans nest; when the Timer is dropped, the outermost span
/// finishes and a summary of every span is logged, followed by any notes and warnings.
pub struct Timer {
    results: Vec<String>,
    stack: Vec<TimerSpan>,

    outermost_name: String,

    notes: Vec<String>,
    warnings: Vec<String>,
}

impl Timer {
    pub fn new<I: AsRef<str>>(raw_name: I) -> Timer {
        let name = raw_name.as_ref();
        let mut t = Timer {
            results: Vec::new(),
            stack: Vec::new(),
            outermost_name: name.to_string(),
            notes: Vec::new(),
            warnings: Vec::new(),
        };
        t.start(name);
        t
    }

    /// For callers that need a Timer but don't care about the summary.
    pub fn throwaway() -> Timer {
        Timer::new("throwaway")
    }

    /// Log immediately, but also repeat at the end, to avoid having to scroll up and find
    /// interesting debug stuff.
    pub fn note<I: Into<String>>(&mut self, raw_line: I) {
        let line = raw_line.into();
        info!("{}", line);
        self.notes.push(line);
    }

    /// Only logged at the end.
    pub fn warn<I: Into<String>>(&mut self, line: I) {
        self.warnings.push(line.into());
    }

    /// Used to end the scope of a timer early.
    pub fn done(self) {}

    pub fn start<I: AsRef<str>>(&mut self, raw_name: I) {
        let name = raw_name.as_ref();
        info!("{}...", name);
        self.stack.push(TimerSpan {
            name: name.to_string(),
            started_at: Instant::now(),
            nested_results: Vec::new(),
            nested_time: 0.0,
        });
    }

    pub fn stop<I: AsRef<str>>(&mut self, raw_name: I) {
        let name = raw_name.as_ref();
        let span = match self.stack.pop() {
            Some(span) => span,
            None => panic!("Timer::stop({}) without a matching start", name),
        };
        assert_eq!(span.name, name);
        let elapsed = elapsed_seconds(span.started_at);
        let line = format!("{} took {}", name, prettyprint_time(elapsed));

        let padding = "  ".repeat(self.stack.len());
        match self.stack.last_mut() {
            Some(s) => {
                s.nested_results.push(format!("{}- {}", padding, line));
                s.nested_results.extend(span.nested_results);
                if span.nested_time != 0.0 {
                    s.nested_results.push(format!(
                        "  {}- ... plus {}",
                        padding,
                        prettyprint_time(elapsed - span.nested_time)
                    ));
                }
                s.nested_time += elapsed;
            }
            None => {
                self.results.push(format!("{}- {}", padding, line));
                self.results.extend(span.nested_results);
                if span.nested_time != 0.0 {
                    self.results.push(format!(
                        "  - ... plus {}",
                        prettyprint_time(elapsed - span.nested_time)
                    ));
                }
            }
        }

        info!("{}", line);
    }
}

impl std::ops::Drop for Timer {
    fn drop(&mut self) {
        let stop_name = self.outermost_name.clone();

        // If we're in the middle of unwinding a panic or an early return, don't further blow up.
        match self.stack.last() {
            Some(s) if s.name == stop_name && self.stack.len() == 1 => {}
            _ => {
                warn!("dropping Timer {} with unfinished spans", stop_name);
                return;
            }
        }

        self.stop(&stop_name);
        for line in &self.results {
            info!("{}", line);
        }

        if !self.notes.is_empty() {
            info!("{} notes:", self.notes.len());
            for line in &self.notes {
                info!("{}", line);
            }
        }

        if !self.warnings.is_empty() {
            warn!("{} warnings:", self.warnings.len());
            for line in &self.warnings {
                warn!("{}", line);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_spans() {
        let mut timer = Timer::new("outer");
        timer.start("inner");
        timer.note("something interesting");
        timer.stop("inner");
        timer.warn("something odd");
        assert_eq!(timer.stack.len(), 1);
        assert_eq!(timer.stack[0].nested_results.len(), 1);
        timer.done();
    }
}
