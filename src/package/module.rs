//! `go.mod` reading: module path, requirements and replace directives.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    pub path: String,
    pub version: String,
}

/// `replace old [version] => new [version]`; `new_version` is `None` for a
/// local directory replacement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replace {
    pub old_path: String,
    pub old_version: Option<String>,
    pub new_path: String,
    pub new_version: Option<String>,
}

impl Replace {
    pub fn is_local(&self) -> bool {
        self.new_path.starts_with("./")
            || self.new_path.starts_with("../")
            || Path::new(&self.new_path).is_absolute()
    }
}

/// A parsed `go.mod` together with the directory holding it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoMod {
    pub dir: PathBuf,
    pub module: String,
    pub requires: Vec<Requirement>,
    pub replaces: Vec<Replace>,
}

impl GoMod {
    pub fn parse(dir: PathBuf, src: &str) -> anyhow::Result<Self> {
        let mut module = None;
        let mut requires = Vec::new();
        let mut replaces = Vec::new();
        let mut block: Option<String> = None;

        for (index, raw) in src.lines().enumerate() {
            let line_no = index + 1;
            let words = split_words(strip_comment(raw));
            if words.is_empty() {
                continue;
            }

            let (verb, args) = match block.clone() {
                Some(_) if words[0] == ")" => {
                    block = None;
                    continue;
                }
                Some(verb) => (verb, &words[..]),
                None if words.len() == 2 && words[1] == "(" => {
                    block = Some(words[0].clone());
                    continue;
                }
                None => (words[0].clone(), &words[1..]),
            };

            match verb.as_str() {
                "module" => {
                    let Some(path) = args.first() else {
                        bail!("line {line_no}: module directive without a path");
                    };
                    module = Some(path.clone());
                }
                "require" => {
                    let [path, version, ..] = args else {
                        bail!("line {line_no}: malformed require directive");
                    };
                    requires.push(Requirement {
                        path: path.clone(),
                        version: version.clone(),
                    });
                }
                "replace" => replaces.push(
                    parse_replace(args).with_context(|| format!("line {line_no}"))?,
                ),
                _ => {}
            }
        }

        let Some(module) = module else {
            bail!("missing module directive");
        };
        Ok(Self {
            dir,
            module,
            requires,
            replaces,
        })
    }

    /// Path of `import_path` inside this module's tree, when it belongs to it.
    pub fn local_dir(&self, import_path: &str) -> Option<PathBuf> {
        strip_path_prefix(import_path, &self.module).map(|rest| self.dir.join(rest))
    }

    /// The requirement with the longest module path that contains `import_path`.
    pub fn requirement_for<'a>(&'a self, import_path: &'a str) -> Option<(&'a Requirement, &'a str)> {
        self.requires
            .iter()
            .filter_map(|req| strip_path_prefix(import_path, &req.path).map(|rest| (req, rest)))
            .max_by_key(|(req, _)| req.path.len())
    }

    /// The replace directive with the longest old path that contains `import_path`.
    pub fn replacement_for<'a>(&'a self, import_path: &'a str) -> Option<(&'a Replace, &'a str)> {
        self.replaces
            .iter()
            .filter_map(|rep| strip_path_prefix(import_path, &rep.old_path).map(|rest| (rep, rest)))
            .max_by_key(|(rep, _)| rep.old_path.len())
    }
}

/// Walk up from `start` and parse the first `go.mod` found.
pub fn find_go_mod(start: &Path) -> anyhow::Result<Option<GoMod>> {
    for dir in start.ancestors() {
        let candidate = dir.join("go.mod");
        if candidate.is_file() {
            let src = fs::read_to_string(&candidate)
                .with_context(|| format!("Failed to read {}", candidate.display()))?;
            let parsed = GoMod::parse(dir.to_path_buf(), &src)
                .with_context(|| format!("Failed to parse {}", candidate.display()))?;
            return Ok(Some(parsed));
        }
    }
    Ok(None)
}

/// `rest` such that `path == prefix + "/" + rest`, or `""` when equal.
pub(crate) fn strip_path_prefix<'a>(path: &'a str, prefix: &str) -> Option<&'a str> {
    if path == prefix {
        return Some("");
    }
    path.strip_prefix(prefix)?.strip_prefix('/')
}

/// Module-cache directory name: upper-case letters become `!` + lower case.
pub fn escape_module_path(path: &str) -> String {
    let mut escaped = String::with_capacity(path.len());
    for c in path.chars() {
        if c.is_ascii_uppercase() {
            escaped.push('!');
            escaped.push(c.to_ascii_lowercase());
        } else {
            escaped.push(c);
        }
    }
    escaped
}

fn parse_replace(args: &[String]) -> anyhow::Result<Replace> {
    let Some(arrow) = args.iter().position(|w| w == "=>") else {
        bail!("replace directive without '=>'");
    };
    let (old, new) = (&args[..arrow], &args[arrow + 1..]);
    match (old, new) {
        ([old_path, old_version @ ..], [new_path, new_version @ ..])
            if old_version.len() <= 1 && new_version.len() <= 1 =>
        {
            Ok(Replace {
                old_path: old_path.clone(),
                old_version: old_version.first().cloned(),
                new_path: new_path.clone(),
                new_version: new_version.first().cloned(),
            })
        }
        _ => bail!("malformed replace directive"),
    }
}

fn strip_comment(line: &str) -> &str {
    match line.find("//") {
        Some(pos) => &line[..pos],
        None => line,
    }
}

fn split_words(line: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut rest = line.trim_start();
    while !rest.is_empty() {
        if let Some(body) = rest.strip_prefix('"') {
            let end = body.find('"').unwrap_or(body.len());
            words.push(body[..end].to_string());
            rest = body.get(end + 1..).unwrap_or("");
        } else if let Some(body) = rest.strip_prefix('`') {
            let end = body.find('`').unwrap_or(body.len());
            words.push(body[..end].to_string());
            rest = body.get(end + 1..).unwrap_or("");
        } else {
            let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
            words.push(rest[..end].to_string());
            rest = &rest[end..];
        }
        rest = rest.trim_start();
    }
    words
}
