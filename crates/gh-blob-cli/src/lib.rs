use std::future::Future;
use std::time::Duration;

/// Overall limit on a single command, matching the longest upload we expect.
pub const COMMAND_DEADLINE: Duration = Duration::from_secs(30 * 60);

/// Run a command future, failing if it outlives `deadline`.
///
/// Dropping the future on expiry aborts whatever request is in flight.
pub async fn with_deadline<F, T>(deadline: Duration, command: F) -> anyhow::Result<T>
where
    F: Future<Output = anyhow::Result<T>>,
{
    tokio::time::timeout(deadline, command)
        .await
        .map_err(|_| anyhow::anyhow!("Command timed out after {}s", deadline.as_secs()))?
}

/// Render a byte count with a binary unit, e.g. `1.5 GiB`.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];
    if bytes < 1024 {
        return format!("{} B", bytes);
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", value, UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_bytes_small() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(1023), "1023 B");
    }

    #[test]
    fn format_bytes_units() {
        assert_eq!(format_bytes(1024), "1.0 KiB");
        assert_eq!(format_bytes(100 * 1024 * 1024), "100.0 MiB");
        assert_eq!(format_bytes(3 * 1024 * 1024 * 1024 / 2), "1.5 GiB");
    }

    #[test]
    fn format_bytes_caps_at_largest_unit() {
        assert_eq!(format_bytes(2048 * 1024u64.pow(4)), "2048.0 TiB");
    }

    #[tokio::test]
    async fn deadline_passes_result_through() {
        let value = with_deadline(Duration::from_secs(5), async { Ok(7) }).await.unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn deadline_expires() {
        let err = with_deadline(Duration::from_millis(10), async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(())
        })
        .await
        .unwrap_err();
        assert!(err.to_string().contains("timed out"));
    }
}

/// Initialize tracing for the CLI binary.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}
