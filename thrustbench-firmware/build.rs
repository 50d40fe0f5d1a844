//! Build script for thrustbench-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates stand.toml and generates the STAND_CONFIG constants

use std::env;
use std::fmt::Write as _;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Presets the test menu can hold
const MAX_PRESETS: usize = 8;

fn main() {
    setup_linker();
    let config = load_config();
    let generated = generate(&config);

    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    fs::write(out_dir.join("stand_config.rs"), generated).unwrap();
    println!("cargo:warning=stand.toml validated successfully");
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    println!("cargo:rustc-link-search={}", out_dir.display());
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Abort the build with a boxed list of problems
fn fail(title: &str, errors: &[String]) -> ! {
    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<56} ║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title,
        errors
            .iter()
            .map(|e| format!("║  • {:<62} ║", e))
            .collect::<Vec<_>>()
            .join("\n")
    );
}

fn load_config() -> toml::Value {
    println!("cargo:rerun-if-changed=stand.toml");

    let path = Path::new("stand.toml");
    if !path.exists() {
        fail(
            "stand.toml not found",
            &["Create stand.toml in the thrustbench-firmware directory".to_string()],
        );
    }

    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => fail("Failed to read stand.toml", &[e.to_string()]),
    };

    match toml::from_str(&content) {
        Ok(value) => value,
        Err(e) => {
            let lines: Vec<String> = e
                .to_string()
                .lines()
                .map(|line| {
                    if line.len() > 60 {
                        format!("{}...", &line[..57])
                    } else {
                        line.to_string()
                    }
                })
                .collect();
            fail("Invalid TOML syntax in stand.toml", &lines)
        }
    }
}

/// Typed field access that records problems instead of stopping at the first
struct Reader<'a> {
    root: &'a toml::Value,
    errors: Vec<String>,
}

impl<'a> Reader<'a> {
    fn table(&mut self, section: &str) -> Option<&'a toml::value::Table> {
        let error = match self.root.get(section) {
            Some(toml::Value::Table(t)) => return Some(t),
            Some(_) => format!("[{}] must be a table", section),
            None => format!("Missing [{}] section", section),
        };
        // Reported once per section, not once per field
        if !self.errors.contains(&error) {
            self.errors.push(error);
        }
        None
    }

    fn float(&mut self, section: &str, key: &str) -> f64 {
        let value = self.table(section).and_then(|t| t.get(key)).cloned();
        read_float(&mut self.errors, section, key, value.as_ref())
    }

    fn int(&mut self, section: &str, key: &str, min: i64, max: i64) -> i64 {
        let value = self.table(section).and_then(|t| t.get(key)).cloned();
        read_int(&mut self.errors, section, key, value.as_ref(), min, max)
    }

    /// One of a fixed set of strings, the first option on error
    fn choice(&mut self, section: &str, key: &str, options: &[&'static str]) -> &'static str {
        let value = self.table(section).and_then(|t| t.get(key)).and_then(|v| v.as_str());
        match value.and_then(|v| options.iter().find(|option| **option == v)) {
            Some(option) => *option,
            None => {
                self.errors.push(format!(
                    "[{}] '{}' must be one of: {}",
                    section,
                    key,
                    options.join(", ")
                ));
                options[0]
            }
        }
    }
}

fn read_float(
    errors: &mut Vec<String>,
    section: &str,
    key: &str,
    value: Option<&toml::Value>,
) -> f64 {
    match value {
        Some(toml::Value::Float(v)) if v.is_finite() => *v,
        Some(toml::Value::Integer(v)) => *v as f64,
        Some(_) => {
            errors.push(format!("[{}] '{}' must be a number", section, key));
            0.0
        }
        None => {
            errors.push(format!("[{}] missing '{}'", section, key));
            0.0
        }
    }
}

fn read_int(
    errors: &mut Vec<String>,
    section: &str,
    key: &str,
    value: Option<&toml::Value>,
    min: i64,
    max: i64,
) -> i64 {
    match value {
        Some(toml::Value::Integer(v)) if (min..=max).contains(v) => *v,
        Some(toml::Value::Integer(_)) => {
            errors.push(format!("[{}] '{}' must be {}-{}", section, key, min, max));
            min
        }
        Some(_) => {
            errors.push(format!("[{}] '{}' must be an integer", section, key));
            min
        }
        None => {
            errors.push(format!("[{}] missing '{}'", section, key));
            min
        }
    }
}

struct Preset {
    kind: &'static str,
    start_us: i64,
    end_us: i64,
    step_us: i64,
    target_g: f64,
}

struct StandValues {
    max_current_a: f64,
    critical_temp_c: f64,
    warn_temp_c: f64,
    min_voltage_v: f64,
    fault_debounce_ticks: i64,
    stale_timeout_ms: i64,
    min_us: i64,
    max_us: i64,
    arm_us: i64,
    safe_stop_us: i64,
    tick_ms: i64,
    settle_ms: i64,
    window_ms: i64,
    publish_interval_ms: i64,
    gain_us_per_g: f64,
    tolerance_g: f64,
    converge_ticks: i64,
    counts_per_gram: f64,
    filter_alpha: f64,
    tare_samples: i64,
    divider_ratio: f64,
    current_mv_per_amp: f64,
    ntc_pullup_ohms: i64,
    temperature_interval_ms: i64,
    link_format: &'static str,
    presets: Vec<Preset>,
}

/// Read every value and check the cross-field rules
fn validate(root: &toml::Value) -> StandValues {
    let mut r = Reader {
        root,
        errors: Vec::new(),
    };
    const MINUTE: i64 = 60_000;

    let mut values = StandValues {
        max_current_a: r.float("safety", "max_current_a"),
        critical_temp_c: r.float("safety", "critical_temp_c"),
        warn_temp_c: r.float("safety", "warn_temp_c"),
        min_voltage_v: r.float("safety", "min_voltage_v"),
        fault_debounce_ticks: r.int("safety", "fault_debounce_ticks", 1, 255),
        stale_timeout_ms: r.int("safety", "stale_timeout_ms", 1, MINUTE),
        min_us: r.int("actuator", "min_us", 500, 2500),
        max_us: r.int("actuator", "max_us", 500, 2500),
        arm_us: r.int("actuator", "arm_us", 500, 2500),
        safe_stop_us: r.int("actuator", "safe_stop_us", 500, 2500),
        tick_ms: r.int("timing", "tick_ms", 1, 1000),
        settle_ms: r.int("timing", "settle_ms", 1, MINUTE),
        window_ms: r.int("timing", "window_ms", 1, MINUTE),
        publish_interval_ms: r.int("timing", "publish_interval_ms", 1, MINUTE),
        gain_us_per_g: r.float("seek", "gain_us_per_g"),
        tolerance_g: r.float("seek", "tolerance_g"),
        converge_ticks: r.int("seek", "converge_ticks", 1, 255),
        counts_per_gram: r.float("load_cell", "counts_per_gram"),
        filter_alpha: r.float("load_cell", "filter_alpha"),
        tare_samples: r.int("load_cell", "tare_samples", 1, 255),
        divider_ratio: r.float("sensors", "divider_ratio"),
        current_mv_per_amp: r.float("sensors", "current_mv_per_amp"),
        ntc_pullup_ohms: r.int("sensors", "ntc_pullup_ohms", 100, 1_000_000),
        temperature_interval_ms: r.int("sensors", "temperature_interval_ms", 0, MINUTE),
        link_format: r.choice("link", "format", &["binary", "csv"]),
        presets: Vec::new(),
    };
    let mut errors = r.errors;

    for (key, value) in [
        ("max_current_a", values.max_current_a),
        ("critical_temp_c", values.critical_temp_c),
        ("min_voltage_v", values.min_voltage_v),
        ("gain_us_per_g", values.gain_us_per_g),
        ("tolerance_g", values.tolerance_g),
        ("counts_per_gram", values.counts_per_gram),
        ("divider_ratio", values.divider_ratio),
        ("current_mv_per_amp", values.current_mv_per_amp),
    ] {
        if value <= 0.0 {
            errors.push(format!("'{}' must be positive", key));
        }
    }
    if values.warn_temp_c >= values.critical_temp_c {
        errors.push("[safety] warn_temp_c must be below critical_temp_c".to_string());
    }
    if !(values.filter_alpha > 0.0 && values.filter_alpha <= 1.0) {
        errors.push("[load_cell] filter_alpha must be in (0, 1]".to_string());
    }

    let actuator = values.min_us..=values.max_us;
    if values.min_us >= values.max_us {
        errors.push("[actuator] min_us must be below max_us".to_string());
    }
    if !actuator.contains(&values.arm_us) || !actuator.contains(&values.safe_stop_us) {
        errors.push("[actuator] arm_us and safe_stop_us must be in min-max".to_string());
    }

    match root.get("preset") {
        Some(toml::Value::Array(presets)) => {
            if presets.is_empty() || presets.len() > MAX_PRESETS {
                errors.push(format!("between 1 and {} [[preset]] entries required", MAX_PRESETS));
            }
            for (i, preset) in presets.iter().enumerate() {
                let section = format!("preset {}", i);
                let Some(table) = preset.as_table() else {
                    errors.push(format!("[[preset]] {} must be a table", i));
                    continue;
                };
                let preset = read_preset(&mut errors, &section, table, &actuator);
                if let Some(preset) = preset {
                    values.presets.push(preset);
                }
            }
        }
        Some(_) => errors.push("'preset' must be an array of tables".to_string()),
        None => errors.push("Missing [[preset]] entries".to_string()),
    }

    if !errors.is_empty() {
        fail("Invalid stand.toml", &errors);
    }
    values
}

fn read_preset(
    errors: &mut Vec<String>,
    section: &str,
    table: &toml::value::Table,
    actuator: &std::ops::RangeInclusive<i64>,
) -> Option<Preset> {
    let start_us = read_int(errors, section, "start_us", table.get("start_us"), 0, 3000);
    if !actuator.contains(&start_us) {
        errors.push(format!("[{}] start_us outside the actuator range", section));
    }

    match table.get("kind").and_then(|k| k.as_str()) {
        Some("ramp") => {
            let end_us = read_int(errors, section, "end_us", table.get("end_us"), 0, 3000);
            let step_us = read_int(errors, section, "step_us", table.get("step_us"), 1, 1000);
            if !actuator.contains(&end_us) {
                errors.push(format!("[{}] end_us outside the actuator range", section));
            }
            if end_us < start_us {
                errors.push(format!("[{}] end_us must not be below start_us", section));
            }
            Some(Preset {
                kind: "ramp",
                start_us,
                end_us,
                step_us,
                target_g: 0.0,
            })
        }
        Some("thrust") => {
            let target_g = read_float(errors, section, "target_g", table.get("target_g"));
            if target_g <= 0.0 {
                errors.push(format!("[{}] target_g must be positive", section));
            }
            Some(Preset {
                kind: "thrust",
                start_us,
                end_us: start_us,
                step_us: 0,
                target_g,
            })
        }
        _ => {
            errors.push(format!("[{}] kind must be 'ramp' or 'thrust'", section));
            None
        }
    }
}

/// Emit the Rust source included by src/config.rs
fn generate(root: &toml::Value) -> String {
    let v = validate(root);
    let mut out = String::new();

    writeln!(out, "// Generated by build.rs from stand.toml").unwrap();
    writeln!(
        out,
        "pub const STAND_CONFIG: StandConfig = StandConfig {{
    safety: SafetyLimits {{
        max_current_a: {:?},
        critical_temp_c: {:?},
        warn_temp_c: {:?},
        min_voltage_v: {:?},
        fault_debounce_ticks: {},
        stale_timeout_ms: {},
    }},
    actuator: ActuatorLimits {{
        min_us: {},
        max_us: {},
        arm_us: {},
        safe_stop_us: {},
    }},
    timing: SequenceTiming {{
        tick_ms: {},
        settle_ms: {},
        window_ms: {},
    }},
    seek: SeekTuning {{
        gain_us_per_g: {:?},
        tolerance_g: {:?},
        converge_ticks: {},
    }},
    telemetry: TelemetryTiming {{
        publish_interval_ms: {},
    }},
    load_cell: LoadCellConfig {{
        counts_per_gram: {:?},
        filter_alpha: {:?},
        tare_samples: {},
    }},
}};",
        v.max_current_a,
        v.critical_temp_c,
        v.warn_temp_c,
        v.min_voltage_v,
        v.fault_debounce_ticks,
        v.stale_timeout_ms,
        v.min_us,
        v.max_us,
        v.arm_us,
        v.safe_stop_us,
        v.tick_ms,
        v.settle_ms,
        v.window_ms,
        v.gain_us_per_g,
        v.tolerance_g,
        v.converge_ticks,
        v.publish_interval_ms,
        v.counts_per_gram,
        v.filter_alpha,
        v.tare_samples,
    )
    .unwrap();

    writeln!(out, "pub const PRESETS: [TestConfig; {}] = [", v.presets.len()).unwrap();
    for p in &v.presets {
        match p.kind {
            "ramp" => writeln!(
                out,
                "    TestConfig::ramp_map({}, {}, {}),",
                p.start_us, p.end_us, p.step_us
            ),
            _ => writeln!(
                out,
                "    TestConfig::constant_thrust({:?}, {}),",
                p.target_g, p.start_us
            ),
        }
        .unwrap();
    }
    writeln!(out, "];").unwrap();

    writeln!(out, "pub const DIVIDER_RATIO: f32 = {:?};", v.divider_ratio).unwrap();
    writeln!(out, "pub const CURRENT_MV_PER_AMP: f32 = {:?};", v.current_mv_per_amp).unwrap();
    writeln!(out, "pub const NTC_PULLUP_OHMS: u32 = {};", v.ntc_pullup_ohms).unwrap();
    writeln!(
        out,
        "pub const TEMPERATURE_INTERVAL_MS: u32 = {};",
        v.temperature_interval_ms
    )
    .unwrap();

    let link_format = match v.link_format {
        "csv" => "LinkFormat::Csv",
        _ => "LinkFormat::Binary",
    };
    writeln!(out, "pub const LINK_FORMAT: LinkFormat = {};", link_format).unwrap();

    out
}
