//! # Girderline CLI
//!
//! Prints the analysis results of a bridge scenario: live load distribution
//! factors with their narrative, shear critical sections and the girder
//! check. Runs the distribution factor conformance suite on request.
//!
//! ```text
//! girder_cli [SCENARIO.json] [--narrative] [--json] [--conformance]
//! ```
//!
//! Without a scenario the built-in demo bridge is analysed. Set `RUST_LOG`
//! (for example `RUST_LOG=girder_core=debug`) to see cache activity and the
//! critical section intercept tables.

use std::env;
use std::fs;
use std::process::ExitCode;

use girder_core::cache::AnalysisContext;
use girder_core::critical_section::{CriticalSection, CriticalSectionLocation};
use girder_core::distribution::conformance::run_reference_conformance;
use girder_core::distribution::narrative;
use girder_core::errors::{CalcError, CalcResult};
use girder_core::keys::{girder_label, GirderKey, LimitState, PierFace, PierKey, SpanKey};
use girder_core::model::BridgeModel;
use girder_core::providers::GeometryProvider;

#[derive(Debug, Default)]
struct Options {
    scenario: Option<String>,
    narrative: bool,
    json: bool,
    conformance: bool,
}

fn parse_args() -> Result<Options, String> {
    let mut options = Options::default();
    for arg in env::args().skip(1) {
        match arg.as_str() {
            "--narrative" => options.narrative = true,
            "--json" => options.json = true,
            "--conformance" => options.conformance = true,
            "-h" | "--help" => {
                return Err("usage: girder_cli [SCENARIO.json] [--narrative] [--json] [--conformance]".to_string())
            }
            flag if flag.starts_with("--") => return Err(format!("unknown option {}", flag)),
            path => options.scenario = Some(path.to_string()),
        }
    }
    Ok(options)
}

fn load_model(options: &Options) -> CalcResult<BridgeModel> {
    match &options.scenario {
        Some(path) => {
            log::info!("loading scenario {}", path);
            let json = fs::read_to_string(path)
                .map_err(|e| CalcError::invalid_input("scenario", path.as_str(), e.to_string()))?;
            BridgeModel::from_json(&json)
        }
        None => {
            log::info!("no scenario given, using the demo bridge");
            Ok(BridgeModel::demo())
        }
    }
}

fn banner(title: &str) {
    println!("═══════════════════════════════════════════════════════");
    println!("  {}", title);
    println!("═══════════════════════════════════════════════════════");
}

fn status_icon(passes: bool) -> &'static str {
    if passes {
        "✓"
    } else {
        "✗"
    }
}

fn print_distribution_factors(ctx: &AnalysisContext, options: &Options) -> CalcResult<()> {
    let model = ctx.model();
    banner("LIVE LOAD DISTRIBUTION FACTORS");
    println!();
    println!("  {:<20} {:>10} {:>10} {:>10} {:>10}", "Girder", "Moment", "Shear", "Fat. M", "Fat. V");
    for span in 0..model.span_count() {
        for girder in 0..model.girder_count(span) {
            let key = SpanKey::new(span, girder);
            println!(
                "  {:<20} {:>10.4} {:>10.4} {:>10.4} {:>10.4}",
                key.to_string(),
                ctx.moment_df(key, LimitState::StrengthI, None)?,
                ctx.shear_df(key, LimitState::StrengthI, None)?,
                ctx.moment_df(key, LimitState::FatigueI, None)?,
                ctx.shear_df(key, LimitState::FatigueI, None)?,
            );
            if options.narrative {
                println!();
                println!("{}", ctx.computation_description(key, LimitState::StrengthI)?);
            }
        }
    }

    for pier in 0..model.pier_count() {
        if !model.is_continuous_pier(pier) || !model.is_interior_pier(pier) {
            continue;
        }
        println!();
        println!("  Pier {} (continuous)", pier + 1);
        for girder in 0..model.girder_count(pier) {
            let back = ctx.negative_moment_df(pier, girder, LimitState::StrengthI, PierFace::Back, None)?;
            let ahead = ctx.negative_moment_df(pier, girder, LimitState::StrengthI, PierFace::Ahead, None)?;
            let reaction = ctx.reaction_df(pier, girder, LimitState::StrengthI, None)?;
            println!(
                "    Girder {:<3} -M back {:>8.4}  -M ahead {:>8.4}  reaction {:>8.4}",
                girder_label(girder),
                back,
                ahead,
                reaction
            );
            if options.narrative {
                let key = PierKey::new(pier, girder);
                let details = ctx.pier_factor_details(key, PierFace::Back, LimitState::StrengthI, None)?;
                println!("{}", narrative::describe_pier(&details));
                let details = ctx.reaction_factor_details(key, LimitState::StrengthI, None)?;
                println!("{}", narrative::describe_reaction(&details));
            }
        }
    }
    println!();
    Ok(())
}

fn describe_section(cs: &CriticalSection) -> String {
    match &cs.location {
        CriticalSectionLocation::AtFaceOfSupport => format!(
            "at face of support (uplift, Rmin = {:.2} kip)",
            cs.min_reaction_kip
        ),
        CriticalSectionLocation::Intersection {
            distance_from_face_ft,
            dv_in,
            theta_deg,
            governing,
            ..
        } => format!(
            "{:.3} ft from face, dv = {:.2} in, θ = {}, governed by {:?}",
            distance_from_face_ft,
            dv_in,
            theta_deg.map_or("n/a".to_string(), |t| format!("{:.1}°", t)),
            governing
        ),
    }
}

fn print_girder_checks(ctx: &AnalysisContext, options: &Options) -> CalcResult<bool> {
    let model = ctx.model();
    let mut all_pass = true;
    banner("SHEAR CRITICAL SECTIONS AND GIRDER CHECK (STRENGTH I)");
    for span in 0..model.span_count() {
        for girder in 0..model.girder_count(span) {
            let key = GirderKey::new(span, girder);
            let artifact = ctx.girder_check(key, LimitState::StrengthI, None)?;
            println!();
            println!("  Span {} Girder {}", span + 1, girder_label(girder));
            for cs in &artifact.critical_sections {
                println!(
                    "    Pier {} {} face: {}",
                    cs.pier.pier + 1,
                    cs.face.display_name(),
                    describe_section(cs)
                );
            }
            if let Some(flexure) = artifact.controlling_flexure() {
                println!(
                    "    Flexure: {:.2} (Mu {:.0} / Mr {:.0} kip-ft at {:.2} ft) {}",
                    flexure.flexure_ratio,
                    flexure.mu_kip_ft,
                    flexure.mr_kip_ft,
                    flexure.poi.distance_from_start_ft,
                    status_icon(flexure.flexure_ratio <= 1.0)
                );
            }
            if let Some(shear) = artifact.controlling_shear() {
                println!(
                    "    Shear:   {:.2} (Vu {:.1} / φVn {:.1} kip at {:.2} ft) {}",
                    shear.shear_ratio,
                    shear.vu_kip,
                    shear.phi_vn_kip,
                    shear.poi.distance_from_start_ft,
                    status_icon(shear.shear_ratio <= 1.0)
                );
            }
            println!("    Result:  {}", if artifact.passes() { "PASS" } else { "FAIL" });
            all_pass &= artifact.passes();

            if options.json {
                println!("{}", serde_json::to_string_pretty(artifact.as_ref()).map_err(|e| CalcError::serialization(&e))?);
            }
        }
    }
    println!();
    Ok(all_pass)
}

fn print_status(ctx: &AnalysisContext) {
    let status = ctx.status();
    if status.is_empty() {
        return;
    }
    banner("STATUS");
    for item in status.items() {
        println!("  [{:?}] {:?}: {}", item.severity, item.category, item.message);
    }
    println!();
}

fn run_conformance() -> CalcResult<bool> {
    banner("DISTRIBUTION FACTOR CONFORMANCE");
    let report = run_reference_conformance()?;
    for outcome in report.outcomes.iter().filter(|o| !o.passed) {
        println!(
            "  {} {}: deviation {:?} {}",
            status_icon(false),
            outcome.id,
            outcome.max_deviation,
            outcome.error.as_deref().unwrap_or("")
        );
    }
    println!(
        "  {} passed, {} failed (tolerance {:e})",
        report.passed_count(),
        report.failed_count(),
        report.tolerance
    );
    println!();
    Ok(report.all_passed())
}

fn run(options: &Options) -> CalcResult<bool> {
    if options.conformance {
        return run_conformance();
    }

    let model = load_model(options)?;
    println!("Girderline - {}", model.name);
    println!();
    let ctx = AnalysisContext::for_model(model);

    let result = print_distribution_factors(&ctx, options).and_then(|_| print_girder_checks(&ctx, options));
    print_status(&ctx);
    result
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let options = match parse_args() {
        Ok(options) => options,
        Err(message) => {
            eprintln!("{}", message);
            return ExitCode::from(2);
        }
    };

    match run(&options) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {}", e);
            if let Ok(json) = serde_json::to_string_pretty(&e) {
                eprintln!();
                eprintln!("Error JSON:");
                eprintln!("{}", json);
            }
            ExitCode::FAILURE
        }
    }
}
