use super::Capabilities;

/// Parse the probe's `field0,starttls,requiretls,blocktls,cert` line.
///
/// Flags are true only for the literal `1`. Missing fields keep their
/// defaults; the certificate field takes the rest of the line.
pub fn parse_probe_output(output: &str) -> Capabilities {
    let Some(line) = output.lines().find(|line| !line.trim().is_empty()) else {
        return Capabilities::default();
    };
    let fields: Vec<&str> = line.splitn(5, ',').collect();
    let flag = |index: usize| fields.get(index).is_some_and(|field| field.trim() == "1");

    Capabilities {
        starttls: flag(1),
        requiretls: flag(2),
        blocktls: flag(3),
        cert: fields
            .get(4)
            .map(|cert| cert.trim().to_string())
            .unwrap_or_default(),
    }
}
