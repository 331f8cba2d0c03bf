//! Build constraints: which `.go` files belong to the package on the target
//! platform.
//!
//! Files are filtered the way `go build` does it:
//!
//! - `_test.go` files and names starting with `_` or `.` are ignored
//! - `name_GOOS.go`, `name_GOARCH.go` and `name_GOOS_GOARCH.go` only match
//!   their platform
//! - a `//go:build` expression (or legacy `// +build` lines) in the file
//!   header must evaluate to true

use crate::config::GoEnv;

const KNOWN_OS: &[&str] = &[
    "aix", "android", "darwin", "dragonfly", "freebsd", "hurd", "illumos", "ios", "js", "linux",
    "nacl", "netbsd", "openbsd", "plan9", "solaris", "wasip1", "windows", "zos",
];

const UNIX_OS: &[&str] = &[
    "aix", "android", "darwin", "dragonfly", "freebsd", "hurd", "illumos", "ios", "linux",
    "netbsd", "openbsd", "solaris",
];

const KNOWN_ARCH: &[&str] = &[
    "386", "amd64", "amd64p32", "arm", "armbe", "arm64", "arm64be", "loong64", "mips", "mipsle",
    "mips64", "mips64le", "mips64p32", "mips64p32le", "ppc", "ppc64", "ppc64le", "riscv",
    "riscv64", "s390", "s390x", "sparc", "sparc64", "wasm",
];

/// Target platform and tags used to evaluate constraints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildContext {
    pub goos: String,
    pub goarch: String,
    pub cgo_enabled: bool,
    pub tags: Vec<String>,
}

impl BuildContext {
    pub fn from_env(env: &GoEnv) -> Self {
        Self {
            goos: env.goos.clone(),
            goarch: env.goarch.clone(),
            cgo_enabled: env.cgo_enabled,
            tags: env.build_tags.clone(),
        }
    }

    /// Whether a single build tag is satisfied.
    pub fn matches_tag(&self, tag: &str) -> bool {
        if tag == self.goos || tag == self.goarch {
            return true;
        }
        match tag {
            "gc" => true,
            "cgo" => self.cgo_enabled,
            "unix" => UNIX_OS.contains(&self.goos.as_str()),
            "linux" => self.goos == "android",
            "darwin" => self.goos == "ios",
            "solaris" => self.goos == "illumos",
            _ if is_release_tag(tag) => true,
            _ => self.tags.iter().any(|t| t == tag),
        }
    }

    /// Whether the file name is buildable: Go source, not a test, and any
    /// GOOS/GOARCH suffix matches.
    pub fn matches_file_name(&self, name: &str) -> bool {
        let Some(stem) = name.strip_suffix(".go") else {
            return false;
        };
        if name.starts_with('_') || name.starts_with('.') || stem.ends_with("_test") {
            return false;
        }
        let Some(first) = stem.find('_') else {
            return true;
        };
        let parts: Vec<&str> = stem[first..].split('_').collect();
        let n = parts.len();
        if n >= 3 && KNOWN_OS.contains(&parts[n - 2]) && KNOWN_ARCH.contains(&parts[n - 1]) {
            return self.matches_tag(parts[n - 2]) && self.matches_tag(parts[n - 1]);
        }
        let last = parts[n - 1];
        if KNOWN_OS.contains(&last) || KNOWN_ARCH.contains(&last) {
            return self.matches_tag(last);
        }
        true
    }

    /// Evaluate the constraint comments in the file header.
    ///
    /// A `//go:build` line wins over `// +build` lines. Malformed expressions
    /// exclude the file.
    pub fn matches_source(&self, src: &str) -> bool {
        let header = header_comments(src);
        if let Some(expr) = header
            .iter()
            .find_map(|line| line.strip_prefix("//go:build"))
        {
            return match parse_expr(expr) {
                Some(expr) => expr.eval(self),
                None => {
                    tracing::warn!(constraint = expr.trim(), "ignoring file with malformed //go:build line");
                    false
                }
            };
        }
        header
            .iter()
            .filter_map(|line| line.strip_prefix("//").map(str::trim_start))
            .filter_map(|line| line.strip_prefix("+build"))
            .all(|line| self.matches_plus_build(line))
    }

    /// `// +build a,b !c` is `(a && b) || !c`.
    fn matches_plus_build(&self, line: &str) -> bool {
        line.split_whitespace().any(|term| {
            term.split(',').all(|atom| match atom.strip_prefix('!') {
                Some(tag) => !self.matches_tag(tag),
                None => self.matches_tag(atom),
            })
        })
    }
}

fn is_release_tag(tag: &str) -> bool {
    tag.strip_prefix("go1.")
        .is_some_and(|minor| !minor.is_empty() && minor.bytes().all(|b| b.is_ascii_digit()))
}

/// Line comments preceding the package clause; block comments are skipped.
fn header_comments(src: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut in_block = false;
    for raw in src.lines() {
        let line = raw.trim();
        if in_block {
            if line.contains("*/") {
                in_block = false;
            }
            continue;
        }
        if line.is_empty() {
            continue;
        }
        if line.starts_with("//") {
            lines.push(line);
        } else if line.starts_with("/*") {
            in_block = !line.contains("*/");
        } else {
            break;
        }
    }
    lines
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Expr {
    Tag(String),
    Not(Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
}

impl Expr {
    fn eval(&self, ctx: &BuildContext) -> bool {
        match self {
            Expr::Tag(tag) => ctx.matches_tag(tag),
            Expr::Not(inner) => !inner.eval(ctx),
            Expr::And(a, b) => a.eval(ctx) && b.eval(ctx),
            Expr::Or(a, b) => a.eval(ctx) || b.eval(ctx),
        }
    }
}

fn parse_expr(src: &str) -> Option<Expr> {
    let tokens = tokenize_expr(src)?;
    let mut pos = 0;
    let expr = parse_or(&tokens, &mut pos)?;
    (pos == tokens.len()).then_some(expr)
}

fn tokenize_expr(src: &str) -> Option<Vec<String>> {
    let bytes = src.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i];
        match c {
            b' ' | b'\t' => i += 1,
            b'!' | b'(' | b')' => {
                tokens.push((c as char).to_string());
                i += 1;
            }
            b'&' | b'|' if bytes.get(i + 1) == Some(&c) => {
                tokens.push(src[i..i + 2].to_string());
                i += 2;
            }
            _ if c.is_ascii_alphanumeric() || c == b'_' || c == b'.' => {
                let start = i;
                while i < bytes.len()
                    && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_' || bytes[i] == b'.')
                {
                    i += 1;
                }
                tokens.push(src[start..i].to_string());
            }
            _ => return None,
        }
    }
    Some(tokens)
}

fn parse_or(tokens: &[String], pos: &mut usize) -> Option<Expr> {
    let mut left = parse_and(tokens, pos)?;
    while tokens.get(*pos).is_some_and(|t| t == "||") {
        *pos += 1;
        let right = parse_and(tokens, pos)?;
        left = Expr::Or(Box::new(left), Box::new(right));
    }
    Some(left)
}

fn parse_and(tokens: &[String], pos: &mut usize) -> Option<Expr> {
    let mut left = parse_not(tokens, pos)?;
    while tokens.get(*pos).is_some_and(|t| t == "&&") {
        *pos += 1;
        let right = parse_not(tokens, pos)?;
        left = Expr::And(Box::new(left), Box::new(right));
    }
    Some(left)
}

fn parse_not(tokens: &[String], pos: &mut usize) -> Option<Expr> {
    let token = tokens.get(*pos)?;
    *pos += 1;
    match token.as_str() {
        "!" => Some(Expr::Not(Box::new(parse_not(tokens, pos)?))),
        "(" => {
            let inner = parse_or(tokens, pos)?;
            if tokens.get(*pos).map(String::as_str) != Some(")") {
                return None;
            }
            *pos += 1;
            Some(inner)
        }
        ")" | "&&" | "||" => None,
        tag => Some(Expr::Tag(tag.to_string())),
    }
}
