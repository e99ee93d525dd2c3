/// Compact, human-readable rendering of a millisecond count, as carried in
/// command and search results.
///
/// * < 1 s   ->  "{ms}ms"
/// * < 60 s  ->  "{sec:.2}s"
/// * < 1 h   ->  "{min}m {sec:02}s"
/// * >= 1 h  ->  "{hour}h {min:02}m"
pub fn format_millis(millis: u64) -> String {
    match millis {
        0..1_000 => format!("{millis}ms"),
        1_000..60_000 => format!("{:.2}s", millis as f64 / 1000.0),
        60_000..3_600_000 => {
            let minutes = millis / 60_000;
            let seconds = (millis % 60_000) / 1000;
            format!("{minutes}m {seconds:02}s")
        }
        _ => {
            let hours = millis / 3_600_000;
            let minutes = (millis % 3_600_000) / 60_000;
            format!("{hours}h {minutes:02}m")
        }
    }
}

#[cfg(test)]
#[path = "elapsed.test.rs"]
mod tests;
