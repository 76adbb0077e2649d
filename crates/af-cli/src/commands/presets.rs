//! Presets command: lists the bundled difficulty levels.

use std::io::Write;

use af_core::Preset;
use anyhow::Result;

pub fn run<W: Write>(writer: &mut W) -> Result<()> {
    writeln!(
        writer,
        "{:<8}  {:>6}  {:>9}  {:<19}  {:<9}  {:<6}  summary",
        "preset", "window", "half-life", "thresholds", "rate", "onset"
    )?;
    for preset in Preset::ALL {
        let config = preset.config();
        let t = &config.thresholds;
        let thresholds = format!(
            "{:.2}/{:.2}/{:.2}/{:.2}",
            t.mild, t.moderate, t.severe, t.critical
        );
        let rate = format!("{}-{}/s", config.rate_optimal, config.rate_max);
        let sustained = format!("{}-{}s", config.sustained_onset, config.sustained_max);
        writeln!(
            writer,
            "{:<8}  {:>5.1}s  {:>8.1}s  {thresholds:<19}  {rate:<9}  {sustained:<6}  {}",
            preset.as_str(),
            config.window_duration,
            config.decay_half_life,
            preset.summary(),
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use insta::assert_snapshot;

    #[test]
    fn lists_every_preset() {
        let mut output = Vec::new();
        run(&mut output).unwrap();
        let output = String::from_utf8(output).unwrap();
        assert_snapshot!(output, @r"
        preset    window  half-life  thresholds           rate       onset   summary
        lenient    20.0s       7.0s  0.45/0.65/0.82/0.95  3-8/s      12-30s  forgiving; for learning the controls
        default    15.0s       5.0s  0.30/0.55/0.75/0.90  2-6/s      8-20s   balanced
        strict     12.0s       3.5s  0.22/0.42/0.62/0.80  1.5-4/s    6-15s   punishes repetition quickly
        expert     10.0s       2.5s  0.18/0.35/0.52/0.70  1.2-3.5/s  5-12s   demands constant variety and restraint
        ");
    }
}
