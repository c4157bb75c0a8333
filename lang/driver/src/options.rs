use quarry_lang_printer::PrintCfg;
use quarry_lang_search::SearchOptions;

/// Upper bound on the number of results a single `search` statement may ask for.
pub const MAX_SEARCH_RESULTS: usize = 10;

#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub max_search_depth: usize,
    pub max_search_threads: usize,
    /// Print declarations with their full namespace path
    pub show_namespaces: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        SessionOptions { max_search_depth: 5, max_search_threads: 1, show_namespaces: false }
    }
}

impl SessionOptions {
    pub fn search_options(&self) -> SearchOptions {
        SearchOptions { max_depth: self.max_search_depth, max_threads: self.max_search_threads }
    }

    pub fn print_cfg(&self) -> PrintCfg {
        PrintCfg { show_namespaces: self.show_namespaces, ..Default::default() }
    }
}
