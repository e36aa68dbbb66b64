use std::fs;
use std::io::{self, Write};
use std::process::Command;
use toml_edit::DocumentMut;
use toml_edit::Item;

type BoxResult<T> = Result<T, Box<dyn std::error::Error>>;

const ROOT_CRATE: &str = "sovran-mapper";
const ROOT_MANIFEST: &str = "Cargo.toml";
const MACROS_CRATE: &str = "sovran-mapper-macros";
const MACROS_MANIFEST: &str = "macros/Cargo.toml";

/// A workspace manifest edited in place, formatting preserved.
struct Manifest {
    path: &'static str,
    doc: DocumentMut,
}

impl Manifest {
    fn load(path: &'static str) -> BoxResult<Self> {
        let doc = fs::read_to_string(path)?.parse::<DocumentMut>()?;
        Ok(Self { path, doc })
    }

    fn version(&self) -> BoxResult<String> {
        self.doc["package"]["version"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| format!("{} has no package.version", self.path).into())
    }

    fn set_version(&mut self, version: &str) {
        self.doc["package"]["version"] = Item::from(version);
    }

    /// Pins a path dependency to the version it will be published with.
    fn pin_dependency(&mut self, name: &str, version: &str) -> BoxResult<()> {
        let dependency = self.doc["dependencies"]
            .get_mut(name)
            .ok_or_else(|| format!("{} does not depend on {name}", self.path))?;
        dependency["version"] = toml_edit::value(version);
        Ok(())
    }

    fn save(&self) -> BoxResult<()> {
        fs::write(self.path, self.doc.to_string())?;
        Ok(())
    }
}

/// Accepts `MAJOR.MINOR.PATCH` with an optional `-prerelease` suffix.
fn parse_version(input: &str) -> BoxResult<&str> {
    let version = input.trim();
    let core = version.split_once('-').map_or(version, |(core, _)| core);
    let parts: Vec<_> = core.split('.').collect();
    let numeric = parts.len() == 3
        && parts
            .iter()
            .all(|part| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit()));
    if !numeric {
        return Err(format!("`{version}` is not a MAJOR.MINOR.PATCH version").into());
    }
    Ok(version)
}

/// Stdout of a git query, `None` when git reports failure.
fn git_output(args: &[&str]) -> BoxResult<Option<String>> {
    let output = Command::new("git").args(args).output()?;
    if !output.status.success() {
        return Ok(None);
    }
    Ok(Some(String::from_utf8(output.stdout)?.trim().to_string()))
}

/// The last release tag, or the root commit when nothing is tagged yet.
fn release_base() -> BoxResult<Option<String>> {
    if let Some(tag) = git_output(&["describe", "--tags", "--abbrev=0"])? {
        return Ok(Some(tag));
    }
    git_output(&["rev-list", "--max-parents=0", "HEAD"])
}

fn release_notes(base: Option<&str>) -> BoxResult<String> {
    let range = base.map(|base| format!("{base}..HEAD"));
    let mut args = vec!["log", "--pretty=format:- %s"];
    args.extend(range.as_deref());
    Ok(git_output(&args)?.unwrap_or_default())
}

fn run(program: &str, args: &[&str]) -> BoxResult<()> {
    println!("Executing: {program} {}", args.join(" "));
    let status = Command::new(program).args(args).status()?;
    if !status.success() {
        return Err(format!("`{program} {}` failed", args.join(" ")).into());
    }
    Ok(())
}

fn prompt(message: &str) -> Result<String, io::Error> {
    print!("{message} ");
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

fn confirm(message: &str) -> Result<bool, io::Error> {
    Ok(prompt(&format!("{message} (y/n):"))?.eq_ignore_ascii_case("y"))
}

fn main() -> BoxResult<()> {
    let mut root = Manifest::load(ROOT_MANIFEST)?;
    let mut macros = Manifest::load(MACROS_MANIFEST)?;

    let current = root.version()?;
    let derive_current = macros.version()?;
    println!("{ROOT_CRATE} {current}, {MACROS_CRATE} {derive_current}");
    if derive_current != current {
        println!("Warning: the crates are out of step and will both be moved");
    }

    let input = prompt("New version:")?;
    let version = parse_version(&input)?;
    if !confirm(&format!("Release both crates as {version}?"))? {
        println!("Release aborted.");
        return Ok(());
    }

    macros.set_version(version);
    root.set_version(version);
    root.pin_dependency(MACROS_CRATE, version)?;
    macros.save()?;
    root.save()?;

    // Refreshes Cargo.lock for the new versions
    run("cargo", &["check", "--workspace"])?;

    let base = release_base()?;
    println!("Changes since {}", base.as_deref().unwrap_or("the beginning"));
    let notes = release_notes(base.as_deref())?;
    if notes.is_empty() {
        if !confirm("No commits found. Continue with empty release notes?")? {
            println!("Release aborted.");
            return Ok(());
        }
    } else {
        println!("{notes}");
    }

    let tag = format!("v{version}");
    let commit_message = format!("Bump version to {version}");
    let tag_message = format!("Version {version}");
    run("git", &["add", ROOT_MANIFEST, MACROS_MANIFEST, "Cargo.lock"])?;
    run("git", &["commit", "-m", &commit_message])?;
    run("git", &["tag", "-a", &tag, "-m", &tag_message])?;
    run("git", &["push"])?;
    run("git", &["push", "--tags"])?;

    // The derive crate has to be on crates.io before the crate that pins it
    if confirm("Publish to crates.io?")? {
        for name in [MACROS_CRATE, ROOT_CRATE] {
            run("cargo", &["publish", "-p", name])?;
        }
    } else {
        println!("Skipping crates.io publishing.");
    }

    if confirm("Create GitHub release?")? {
        run(
            "gh",
            &["release", "create", &tag, "--title", &tag, "--notes", &notes],
        )?;
    } else {
        println!("Skipping GitHub release creation.");
    }

    println!("Released {ROOT_CRATE} and {MACROS_CRATE} {version}");
    Ok(())
}
