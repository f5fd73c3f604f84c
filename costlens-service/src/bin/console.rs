//! Interactive console walkthrough of the cost analysis pipeline:
//! symptom -> diagnosis selection -> zip code -> cost report.

use std::io::{self, Write};

use costlens_core::{AppConfig, CompleteAnalysis, CostAnalysis, analysis, icd, zip};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn read_line(prompt: &str) -> io::Result<String> {
    print!("{prompt}");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "costlens_core=warn".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().pretty())
        .init();

    let config = AppConfig::from_env()?;
    let http = reqwest::Client::new();

    let symptom = read_line("Enter a symptom: ")?;
    let candidates = icd::diagnoses_with_descriptions(&http, &config, &symptom).await?;
    if candidates.is_empty() {
        println!("No matching ICD-10 codes found.");
        return Ok(());
    }

    println!("\nICD-10 codes for '{symptom}':\n");
    for (i, candidate) in candidates.iter().enumerate() {
        println!("{}. {}: {}", i + 1, candidate.code, candidate.name);
        println!("   -> {}\n", candidate.description);
    }

    let selection_index = loop {
        let choice = read_line(&format!("Select a code (1-{}): ", candidates.len()))?;
        match choice.parse::<usize>() {
            Ok(n) if (1..=candidates.len()).contains(&n) => break (n - 1) as i64,
            Ok(_) => println!("Please enter a number between 1 and {}", candidates.len()),
            Err(_) => println!("Please enter a valid number"),
        }
    };

    let mut zip_code = read_line("Enter your zip code for cost lookup: ")?;
    while !zip::is_valid_zip(&http, &config, &zip_code).await? {
        println!("Invalid zip code. Please enter a valid 5-digit zip code.");
        zip_code = read_line("Enter your zip code for cost lookup: ")?;
    }

    match analysis::complete_cost_analysis(&http, &config, &symptom, selection_index, &zip_code)
        .await
    {
        Ok(result) => print_report(&result),
        Err(failure) => println!("Error: {failure}"),
    }

    Ok(())
}

fn print_report(result: &CompleteAnalysis) {
    println!(
        "\nSelected: {}: {}",
        result.selected_icd.code, result.selected_icd.name
    );
    println!("{}", "-".repeat(50));

    print_categories(&result.cost_analysis);

    println!("OVERALL COST SUMMARY:");
    println!("{}", "=".repeat(50));
    print_overall(&result.cost_analysis, true);
    print_overall(&result.cost_analysis, false);
    println!("{}", "=".repeat(50));
}

fn print_categories(cost_analysis: &CostAnalysis) {
    for category in &cost_analysis.categories {
        println!("Category: {}", category.category);

        match &category.in_network_range {
            Some(range) => println!(
                "In-Network Range: {} - {}",
                format_usd(range.min),
                format_usd(range.max)
            ),
            None => println!("In-Network Range: No data available"),
        }
        match &category.out_network_range {
            Some(range) => println!(
                "Out-of-Network Range: {} - {}",
                format_usd(range.min),
                format_usd(range.max)
            ),
            None => println!("Out-of-Network Range: No data available"),
        }

        println!("{}", "-".repeat(30));
    }
}

fn print_overall(cost_analysis: &CostAnalysis, in_network: bool) {
    let (label, overall) = if in_network {
        ("In-Network", &cost_analysis.overall_in_network_range)
    } else {
        ("Out-of-Network", &cost_analysis.overall_out_network_range)
    };

    match overall {
        Some(range) => {
            println!(
                "Overall {} Range: {} - {}",
                label,
                format_usd(range.min),
                format_usd(range.max)
            );
            println!("(Sum of {} category ranges)", range.category_count);
        }
        None => println!("Overall {} Range: No data available", label),
    }
}

/// Dollar amount with two decimals and thousands separators, e.g. $1,234.50.
fn format_usd(amount: f64) -> String {
    let formatted = format!("{amount:.2}");
    let (int_part, frac_part) = formatted.split_once('.').unwrap();
    let (sign, digits) = match int_part.strip_prefix('-') {
        Some(digits) => ("-", digits),
        None => ("", int_part),
    };

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("{sign}${grouped}.{frac_part}")
}
