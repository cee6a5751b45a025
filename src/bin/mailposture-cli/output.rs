use anyhow::{Context, Result};

use crate::args::Format;
use mailposture::{MxList, PolicyKind, PolicyLookup, PostureReport, RunSummary};

const WIDTH: usize = 10;

pub fn write_report(report: &PostureReport, format: Format) -> Result<()> {
    match format {
        Format::Human => {
            for line in human_lines(report) {
                println!("{line}");
            }
        }
        Format::Json => {
            let s = serde_json::to_string_pretty(&report.to_record())
                .context("encode posture record")?;
            println!("{s}");
        }
    }
    Ok(())
}

pub fn write_summary(summary: &RunSummary, format: Format) -> Result<()> {
    match format {
        Format::Human => println!("{}", summary_line(summary)),
        Format::Json => println!(
            "{}",
            serde_json::to_string_pretty(summary).context("encode run summary")?
        ),
    }
    Ok(())
}

pub fn human_lines(report: &PostureReport) -> Vec<String> {
    let mut lines = Vec::new();
    if report.agency.is_empty() {
        lines.push(report.domain.clone());
    } else {
        lines.push(format!("{} ({})", report.domain, report.agency));
    }

    for kind in PolicyKind::ALL {
        lines.push(field(&kind.to_string(), &policy_text(report.policy(kind))));
    }
    if let Some(doc) = report.sts_document() {
        lines.push(field("sts-mode", doc.mode.as_str()));
    }
    lines.push(field("mx", &mx_text(&report.mx)));
    lines.push(field("dane", yes_no(report.dane)));
    match &report.capabilities {
        Some(caps) => lines.push(field(
            "tls",
            &format!(
                "starttls={} requiretls={} blocktls={} cert={}",
                yes_no(caps.starttls),
                yes_no(caps.requiretls),
                yes_no(caps.blocktls),
                caps.cert
            ),
        )),
        None => lines.push(field("tls", "not tested")),
    }
    for failure in report.failures() {
        lines.push(format!("  ! {failure}"));
    }
    lines
}

pub fn summary_line(summary: &RunSummary) -> String {
    format!(
        "{} domains: {} inserted, {} updated, {} skipped, {} store failures ({:.1}s)",
        summary.total,
        summary.inserted,
        summary.updated,
        summary.skipped,
        summary.store_failures,
        summary.elapsed_seconds
    )
}

fn field(name: &str, value: &str) -> String {
    format!("  {name:<width$}{value}", width = WIDTH)
}

fn policy_text(lookup: &PolicyLookup) -> String {
    match lookup {
        PolicyLookup::Present(record) => record.clone(),
        PolicyLookup::Absent => lookup.as_stored(),
        PolicyLookup::QueryFailed(_) => format!("{} (query failed)", lookup.as_stored()),
    }
}

fn mx_text(mx: &MxList) -> String {
    match mx {
        MxList::Records(_) => mx.hostnames().join(", "),
        MxList::NoRecords => mx.stored().join(""),
        MxList::QueryFailed(_) => format!("{} (query failed)", mx.stored().join("")),
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "yes" } else { "no" }
}
