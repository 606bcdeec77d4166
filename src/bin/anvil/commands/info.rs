//! `anvil info` command

use std::path::PathBuf;

use anyhow::Result;

use crate::cli::InfoArgs;
use anvil::util::Shell;
use anvil::{GlobalContext, ProjectModel};

pub fn execute(args: InfoArgs, shell: &Shell) -> Result<()> {
    let ctx = GlobalContext::new()?;
    let project = super::load_project(&ctx, args.project.as_deref())?;

    if shell.is_json() {
        println!("{}", to_json(&project));
    } else {
        print!("{}", summary(&project));
    }

    Ok(())
}

fn summary(project: &ProjectModel) -> String {
    let mut out = String::new();
    out.push_str(&format!("project: {}\n", project.name));
    out.push_str(&format!("root: {}\n", project.root_dir.display()));
    section(&mut out, "sources", &paths(&project.sources));
    section(&mut out, "headers", &paths(&project.headers));
    section(&mut out, "compiler flags", &project.compiler.flags);
    section(&mut out, "compiler defines", &project.compiler.defines);
    section(&mut out, "compiler include dirs", &paths(&project.compiler.include_dirs));
    section(&mut out, "linker flags", &project.linker.flags);
    section(&mut out, "linker include dirs", &paths(&project.linker.include_dirs));
    section(&mut out, "linker libraries", &project.linker.libraries);
    out
}

fn section(out: &mut String, title: &str, items: &[String]) {
    if items.is_empty() {
        out.push_str(&format!("{}: (none)\n", title));
        return;
    }
    out.push_str(&format!("{}:\n", title));
    for item in items {
        out.push_str(&format!("  {}\n", item));
    }
}

fn paths(items: &[PathBuf]) -> Vec<String> {
    items.iter().map(|p| p.display().to_string()).collect()
}

fn to_json(project: &ProjectModel) -> serde_json::Value {
    serde_json::json!({
        "name": project.name,
        "root": project.root_dir,
        "sources": project.sources,
        "headers": project.headers,
        "compiler": {
            "flags": project.compiler.flags,
            "defines": project.compiler.defines,
            "include": project.compiler.include_dirs,
        },
        "linker": {
            "flags": project.linker.flags,
            "libraries": project.linker.libraries,
            "include": project.linker.include_dirs,
        },
    })
}
