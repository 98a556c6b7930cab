//! End-to-end embedding demo: register host functions as a script module,
//! hand control to script code that calls them, then call back into the
//! script from the host.

use pybridge::{Module, ModuleDef, def, runtime};

fn part_count(label: String) -> i32 {
    label.len() as i32
}

fn describe(value: i32) -> String {
    format!("host saw {value}")
}

const SCRIPT: &str = r#"
import assembly

def init(count, scale, label):
    parts = assembly.part_count(label)
    note = assembly.describe(count * scale)
    return f"{note} across {parts} parts"
"#;

fn main() -> pybridge::Result<()> {
    runtime::with_gil(|| -> pybridge::Result<()> {
        ModuleDef::new(
            "assembly",
            vec![
                def!("part_count", part_count),
                def!("describe", describe, "formats one host-side value"),
            ],
        )?
        .init()?;

        runtime::run(SCRIPT)?;

        let init = Module::import("__main__").get("init");
        assert!(init.is_valid());
        let summary: String = init.pcall((2, 3, "demo-label".to_string()));
        println!("{summary}");
        Ok(())
    })
}
