use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{Error, Result};
use crate::stats::SimulationStats;

pub trait Formatter {
    fn write(&self, stats: &SimulationStats) -> String;
}

/// System-wide block plus one line per service point.
pub struct HumanFormatter;

/// System-wide block only.
pub struct SummaryFormatter;

/// Pretty-printed JSON snapshot.
pub struct JsonFormatter;

fn summary_block(stats: &SimulationStats) -> String {
    format!(
        concat!(
            "Summary:\n",
            "simulation time: {:.3}\n",
            "arrivals: {}\n",
            "departures: {}\n",
            "avg wait: {:.3}\n",
            "avg response: {:.3}\n",
            "avg service: {:.3}\n",
            "throughput: {:.3}\n",
            "avg in system: {:.3}\n",
        ),
        stats.simulation_time,
        stats.total_arrivals,
        stats.total_departures,
        stats.average_waiting_time(),
        stats.average_response_time(),
        stats.average_service_time(),
        stats.throughput(),
        stats.average_in_system(),
    )
}

impl Formatter for SummaryFormatter {
    fn write(&self, stats: &SimulationStats) -> String {
        summary_block(stats)
    }
}

impl Formatter for HumanFormatter {
    fn write(&self, stats: &SimulationStats) -> String {
        let mut output = summary_block(stats);
        output.push_str("Service points:\n");
        for point in &stats.points {
            output.push_str(&format!(
                "{}: {} arrivals, {} completions (utilization {:.3}, throughput {:.3}, mean service {:.3})\n",
                point.name,
                point.arrivals,
                point.completions,
                point.utilization(stats.simulation_time),
                point.throughput(stats.simulation_time),
                point.mean_service_time(),
            ));
        }
        output
    }
}

impl Formatter for JsonFormatter {
    fn write(&self, stats: &SimulationStats) -> String {
        let mut output =
            serde_json::to_string_pretty(stats).expect("snapshot serialization cannot fail");
        output.push('\n');
        output
    }
}

/// Writes the snapshot as a semicolon-delimited report: a `Metric;Value`
/// summary block and one row per service point.
pub fn write_report(path: &Path, stats: &SimulationStats) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .map_err(|err| Error::ReportIo(format!("failed to create report dir: {}", err)))?;
        }
    }

    let mut report = String::new();
    report.push_str("# Simulation Summary\n");
    report.push_str("Metric;Value\n");
    report.push_str(&format!("Simulation time;{:.3}\n", stats.simulation_time));
    report.push_str(&format!("Total arrivals;{}\n", stats.total_arrivals));
    report.push_str(&format!("Total departures;{}\n", stats.total_departures));
    report.push_str(&format!(
        "Average waiting time;{:.3}\n",
        stats.average_waiting_time()
    ));
    report.push_str(&format!(
        "Average response time;{:.3}\n",
        stats.average_response_time()
    ));
    report.push_str(&format!(
        "Average service time;{:.3}\n",
        stats.average_service_time()
    ));
    report.push_str(&format!("Throughput;{:.3}\n", stats.throughput()));
    report.push_str(&format!(
        "Average number in system;{:.3}\n",
        stats.average_in_system()
    ));
    report.push('\n');
    report.push_str("# Service Point Statistics\n");
    report.push_str("Name;Arrivals;Completions;Utilization;Throughput;AvgServiceTime\n");
    for point in &stats.points {
        report.push_str(&format!(
            "{};{};{};{:.3};{:.3};{:.3}\n",
            point.name,
            point.arrivals,
            point.completions,
            point.utilization(stats.simulation_time),
            point.throughput(stats.simulation_time),
            point.mean_service_time(),
        ));
    }

    fs::write(path, report)
        .map_err(|err| Error::ReportIo(format!("failed to write report: {}", err)))
}

/// Appends one line per run to the history log, writing the header when
/// the file is new. The timestamp is unix seconds.
pub fn append_history(path: &Path, stats: &SimulationStats) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .map_err(|err| Error::ReportIo(format!("failed to create history dir: {}", err)))?;
        }
    }
    let write_header = !path.exists();
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|err| Error::ReportIo(format!("failed to open history: {}", err)))?;
    if write_header {
        writeln!(file, "timestamp;simulationTime;totalCustomers;averageWaiting")
            .map_err(|err| Error::ReportIo(format!("failed to write history: {}", err)))?;
    }
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    writeln!(
        file,
        "{};{:.3};{};{:.3}",
        timestamp,
        stats.simulation_time,
        stats.total_departures,
        stats.average_waiting_time()
    )
    .map_err(|err| Error::ReportIo(format!("failed to write history: {}", err)))
}
