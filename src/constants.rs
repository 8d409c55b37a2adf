//! Constants for the `glst` application.

use nu_ansi_term::Color;

/// Name of the configuration file, relative to the user's home directory.
pub(crate) const ST_CFG_FILE_NAME: &str = ".glst.toml";

/// Directory, relative to the git directory, that holds one sub-directory per stack.
pub(crate) const STACK_REFS_DIR: &str = "refs/stacked";

/// Repository-local git config key naming the active stack.
pub(crate) const CURRENT_STACK_KEY: &str = "glab.currentstack";

/// Branch prefix used when neither the config nor the environment names one.
pub(crate) const DEFAULT_BRANCH_PREFIX: &str = "glab-stack";

/// Number of characters of an entry ID used in its branch name.
pub(crate) const SHORT_SHA_LEN: usize = 8;

pub(crate) const DEFAULT_HOST: &str = "gitlab.com";
pub(crate) const DEFAULT_REMOTE: &str = "origin";

pub(crate) const COLORS: [Color; 6] = [
    Color::Blue,
    Color::Cyan,
    Color::Green,
    Color::Red,
    Color::Yellow,
    Color::Purple,
];

pub(crate) const FILLED_CIRCLE: char = '●';
pub(crate) const EMPTY_CIRCLE: char = '○';
pub(crate) const VERTICAL_BOX: char = '│';
