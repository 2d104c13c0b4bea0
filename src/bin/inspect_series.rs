use std::error::Error;
use std::path::PathBuf;

use dataviz::overlay::build_overlay;
use dataviz::series::MonthlySeries;

fn main() -> Result<(), Box<dyn Error>> {
    // Path to the monthly series CSV
    let file_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .ok_or("usage: inspect_series <series.csv> [step_size]")?;
    let step_size: usize = match std::env::args().nth(2) {
        Some(step) => step.parse()?,
        None => 1,
    };

    println!("Inspecting series file: {}", file_path.display());

    let series = MonthlySeries::from_csv_path(&file_path)?;
    let summary = series.summary();

    println!("\n=== SERIES INFORMATION ===");
    println!("  name          = {}", summary.name);
    println!("  observations  = {}", summary.observations);
    println!("  first month   = {}", summary.first_month.format("%Y-%m"));
    println!("  last month    = {}", summary.last_month.format("%Y-%m"));
    println!("  value range   = {} .. {}", summary.min_value, summary.max_value);

    println!("\nYears:");
    for year in &summary.distinct_years {
        let months = series.years_slice(*year, *year).len();
        println!("  {} ({} months)", year, months);
    }
    if summary.partial_first_year {
        println!("  first year is partial");
    }
    if summary.partial_last_year {
        println!("  last year is partial");
    }

    // Preview the overlay windows a given step size would produce
    println!("\nOverlay windows (step_size = {}):", step_size);
    match build_overlay(&series, step_size, None, "%b") {
        Ok(overlay) => {
            for window in &overlay.windows {
                let present = window.values.iter().flatten().count();
                println!(
                    "  {:<14} {:?} ({} of {} months)",
                    window.label,
                    window.emphasis,
                    present,
                    window.values.len()
                );
            }
        }
        Err(e) => println!("  Cannot build overlay: {}", e),
    }

    Ok(())
}
