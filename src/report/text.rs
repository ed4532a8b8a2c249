// src/report/text.rs
// Plain-text rendering of a CrawlReport.

use std::fmt::Write;

use crate::model::{CrawlReport, PageResult};

const WIDTH: usize = 80;
const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn render(report: &CrawlReport) -> String {
    let mut out = String::new();
    // fmt::Write into a String can't fail
    let _ = write_report(&mut out, report);
    out
}

fn write_report(out: &mut String, report: &CrawlReport) -> std::fmt::Result {
    let heavy = "=".repeat(WIDTH);
    let light = "-".repeat(WIDTH);

    writeln!(out, "{heavy}")?;
    writeln!(out, "{:^WIDTH$}", "KEYSPY SCAN REPORT")?;
    writeln!(out, "{heavy}")?;
    writeln!(out)?;

    writeln!(out, "[Scan]")?;
    writeln!(out, "  Target:    {}", report.target_url)?;
    writeln!(out, "  Keywords:  {}", report.keywords.join(", "))?;
    writeln!(out, "  Started:   {}", report.start_time.format(TIME_FORMAT))?;
    writeln!(out, "  Finished:  {}", report.end_time.format(TIME_FORMAT))?;
    writeln!(out, "  Elapsed:   {:.2?}", report.elapsed)?;
    if report.cancelled {
        writeln!(out, "  Status:    CANCELLED (partial results)")?;
    }
    writeln!(out)?;

    writeln!(out, "[Summary]")?;
    writeln!(out, "  Pages scanned:        {}", report.total_pages)?;
    writeln!(out, "  Pages with keywords:  {}", report.match_pages)?;
    writeln!(out, "  Errors:               {}", report.error_count)?;
    writeln!(out)?;

    if report.results.is_empty() {
        writeln!(out, "[Matches]")?;
        writeln!(out, "  No page contains any of the keywords.")?;
        writeln!(out)?;
    } else {
        writeln!(out, "{light}")?;
        writeln!(out, "{:^WIDTH$}", "MATCHES")?;
        writeln!(out, "{light}")?;
        writeln!(out)?;

        for (i, result) in by_total_desc(&report.results).into_iter().enumerate() {
            writeln!(out, "[{}] URL: {}", i + 1, result.url)?;
            writeln!(out, "    Depth:        {}", result.depth)?;
            writeln!(out, "    Total hits:   {}", result.total_count)?;
            writeln!(out, "    Keywords:     {}", result.keywords.join(", "))?;
            writeln!(out, "    Per keyword:")?;
            for keyword in &result.keywords {
                let count = result.keyword_counts.get(keyword).copied().unwrap_or(0);
                writeln!(out, "      - {keyword}: {count}")?;
            }
            writeln!(out)?;
        }
    }

    writeln!(out, "{heavy}")?;
    writeln!(out, "{:^WIDTH$}", "END OF REPORT")?;
    writeln!(out, "{heavy}")?;
    Ok(())
}

// Most hits first; ties keep crawl order
pub fn by_total_desc(results: &[PageResult]) -> Vec<&PageResult> {
    let mut sorted: Vec<&PageResult> = results.iter().collect();
    sorted.sort_by(|a, b| b.total_count.cmp(&a.total_count));
    sorted
}
