use std::path::Path;

use agar_core::dish::DishDetection;
use agar_core::PipelineConfig;
use console::Style;

use crate::commands::count::FileOutcome;

struct Styles {
    title: Style,
    header: Style,
    label: Style,
    value: Style,
    method: Style,
    disabled: Style,
    path: Style,
    error: Style,
}

impl Styles {
    fn new() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            header: Style::new().cyan().bold(),
            label: Style::new().dim(),
            value: Style::new().bold().white(),
            method: Style::new().green(),
            disabled: Style::new().dim().yellow(),
            path: Style::new().underlined(),
            error: Style::new().red().bold(),
        }
    }
}

pub fn print_config_summary(config: &PipelineConfig, file_count: usize) {
    let s = Styles::new();

    println!();
    println!("  {}", s.title.apply_to("Colony Count"));
    println!("  {}", s.title.apply_to("\u{2550}".repeat(12)));
    println!();

    println!(
        "  {:<14}{}",
        s.label.apply_to("Images"),
        s.value.apply_to(file_count)
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Channel"),
        s.method.apply_to(config.channel)
    );
    match config.debug_directory {
        Some(ref dir) => println!(
            "  {:<14}{}",
            s.label.apply_to("Debug"),
            s.path.apply_to(dir.display())
        ),
        None => println!(
            "  {:<14}{}",
            s.label.apply_to("Debug"),
            s.disabled.apply_to("disabled")
        ),
    }
    println!();

    let locator = &config.locator;
    println!("  {}", s.header.apply_to("Dish Locator"));
    println!(
        "    {:<12}{}",
        s.label.apply_to("Radius"),
        s.value.apply_to(format!(
            "{:.2}-{:.2} of min side",
            locator.min_radius_fraction, locator.max_radius_fraction
        ))
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Votes"),
        s.value.apply_to(format!(
            "{} down to {}",
            locator.vote_threshold, locator.min_vote_threshold
        ))
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Denoise"),
        s.method.apply_to(&locator.denoise)
    );
    println!();

    let classifier = &config.classifier;
    println!("  {}", s.header.apply_to("Classifier"));
    println!(
        "    {:<12}{}",
        s.label.apply_to("Area"),
        s.value.apply_to(format!(
            "{:.1e}-{:.1e} of dish",
            classifier.min_area_ratio, classifier.max_area_ratio
        ))
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Shape"),
        s.value.apply_to(format!(
            "circ >= {:.2}, extent >= {:.2}, solidity >= {:.2}, axis <= {:.1}",
            classifier.min_circularity,
            classifier.min_extent,
            classifier.min_solidity,
            classifier.max_axis_ratio
        ))
    );
    println!();
}

pub fn print_count_results(outcomes: &[FileOutcome], output_dir: &Path) {
    let s = Styles::new();

    println!("  {}", s.header.apply_to("Results"));
    let mut total = 0usize;
    for outcome in outcomes {
        let name = outcome
            .file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| outcome.file.display().to_string());
        match &outcome.result {
            Ok(report) => match report.circle {
                Some(_) => {
                    total += report.colonies_count;
                    println!(
                        "    {:<32}{}",
                        s.label.apply_to(&name),
                        s.value.apply_to(format!("{} colonies", report.colonies_count))
                    );
                    for adjustment in &report.adjustments {
                        println!("      {}", s.disabled.apply_to(adjustment));
                    }
                }
                None => println!(
                    "    {:<32}{}",
                    s.label.apply_to(&name),
                    s.disabled.apply_to("no dish detected")
                ),
            },
            Err(e) => println!(
                "    {:<32}{}",
                s.label.apply_to(&name),
                s.error.apply_to(format!("{e:#}"))
            ),
        }
    }
    println!();
    println!(
        "  {:<14}{}",
        s.label.apply_to("Total"),
        s.value.apply_to(total)
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Output"),
        s.path.apply_to(output_dir.display())
    );
    println!();
}

pub fn print_detection(file: &Path, detection: &DishDetection) {
    let s = Styles::new();

    println!();
    println!(
        "  {:<14}{}",
        s.label.apply_to("Input"),
        s.path.apply_to(file.display())
    );
    match (detection.circle, detection.source) {
        (Some(circle), Some(source)) => {
            println!(
                "  {:<14}{}",
                s.label.apply_to("Dish"),
                s.value.apply_to(format!(
                    "centre ({:.1}, {:.1}), radius {:.1}",
                    circle.center_x, circle.center_y, circle.radius
                ))
            );
            println!(
                "  {:<14}{}",
                s.label.apply_to("Found on"),
                s.method.apply_to(source)
            );
            if let Some(threshold) = detection.vote_threshold {
                println!(
                    "  {:<14}{}",
                    s.label.apply_to("Votes"),
                    s.value.apply_to(format!("{} (threshold {threshold})", detection.votes))
                );
            }
        }
        _ => println!(
            "  {:<14}{}",
            s.label.apply_to("Dish"),
            s.disabled.apply_to("no dish detected")
        ),
    }
    for adjustment in &detection.adjustments {
        println!("  {}", s.disabled.apply_to(adjustment));
    }
    println!();
}
