//! The navigation bar shown at the top of every page on large screens and as a
//! tab bar at the bottom of the screen on phones.

use maud::{Markup, html};

use crate::endpoints;

/// The pages reachable from the navigation bar, in display order.
const TABS: [(&str, &str); 5] = [
    (endpoints::HOME_VIEW, "Home"),
    (endpoints::TRANSACTIONS_VIEW, "Transactions"),
    (endpoints::ADD_TRANSACTION_VIEW, "Add"),
    (endpoints::SUMMARY_VIEW, "Summary"),
    (endpoints::PROFILE_VIEW, "Profile"),
];

const TOP_LINK_STYLE: &str = "block py-2 px-3 rounded-sm text-gray-900 hover:text-indigo-700 \
    dark:text-white dark:hover:text-indigo-400";
const TOP_LINK_CURRENT_STYLE: &str = "block py-2 px-3 rounded-sm font-semibold text-indigo-700 \
    dark:text-indigo-400";

const TAB_STYLE: &str = "flex flex-col items-center justify-center rounded-lg py-2 \
    text-xs font-semibold text-gray-600 hover:text-indigo-700 \
    dark:text-gray-300 dark:hover:text-indigo-300";
const TAB_CURRENT_STYLE: &str = "flex flex-col items-center justify-center rounded-lg py-2 \
    text-xs font-semibold bg-indigo-50 text-indigo-700 shadow-sm \
    dark:bg-indigo-900/30 dark:text-indigo-200";

/// The navigation bar for a page.
pub struct NavBar<'a> {
    active_endpoint: &'a str,
}

impl<'a> NavBar<'a> {
    /// Get the navigation bar.
    ///
    /// The tab whose URL equals `active_endpoint` is highlighted.
    pub fn new(active_endpoint: &'a str) -> Self {
        Self { active_endpoint }
    }

    fn is_current(&self, url: &str) -> bool {
        self.active_endpoint == url
    }

    pub fn into_html(self) -> Markup {
        html!(
            nav class="bg-white border-b border-gray-200 dark:bg-gray-900 dark:border-gray-700"
            {
                div class="max-w-screen-xl flex items-center justify-between mx-auto p-4"
                {
                    a href=(endpoints::HOME_VIEW) class="flex items-center gap-3"
                    {
                        img src="/static/favicon-128x128.png" alt="Spendwise Logo" class="h-8";
                        span class="text-2xl font-semibold whitespace-nowrap dark:text-white"
                        {
                            "Spendwise"
                        }
                    }

                    ul class="hidden lg:flex lg:gap-6 font-medium"
                    {
                        @for (url, title) in TABS {
                            @let is_current = self.is_current(url);
                            @let style = if is_current { TOP_LINK_CURRENT_STYLE } else { TOP_LINK_STYLE };
                            li {
                                a
                                    href=(url)
                                    class=(style)
                                    aria-current=[is_current.then_some("page")]
                                {
                                    (title)
                                }
                            }
                        }
                    }
                }
            }

            nav
                class="fixed inset-x-0 bottom-0 z-40 border-t border-gray-200 bg-white/95
                backdrop-blur lg:hidden dark:border-gray-700 dark:bg-gray-900/95"
                aria-label="Primary"
            {
                ul class="grid grid-cols-5 gap-1 px-2 py-2"
                {
                    @for (url, title) in TABS {
                        @let is_current = self.is_current(url);
                        @let style = if is_current { TAB_CURRENT_STYLE } else { TAB_STYLE };
                        li class="min-w-0" {
                            a
                                href=(url)
                                class=(style)
                                aria-current=[is_current.then_some("page")]
                            {
                                span class="truncate" { (title) }
                            }
                        }
                    }
                }
            }
        )
    }
}

#[cfg(test)]
mod nav_bar_tests {
    use scraper::{Html, Selector};

    use crate::{endpoints, navigation::NavBar};

    fn current_links(active_endpoint: &str) -> Vec<String> {
        let html = Html::parse_fragment(&NavBar::new(active_endpoint).into_html().into_string());
        let selector = Selector::parse("a[aria-current='page']").unwrap();

        html.select(&selector)
            .filter_map(|link| link.value().attr("href").map(str::to_owned))
            .collect()
    }

    #[test]
    fn highlights_the_current_page_in_both_bars() {
        for endpoint in [
            endpoints::HOME_VIEW,
            endpoints::TRANSACTIONS_VIEW,
            endpoints::ADD_TRANSACTION_VIEW,
            endpoints::SUMMARY_VIEW,
            endpoints::PROFILE_VIEW,
        ] {
            assert_eq!(
                current_links(endpoint),
                vec![endpoint.to_owned(), endpoint.to_owned()],
                "want the {endpoint} tab highlighted"
            );
        }
    }

    #[test]
    fn other_pages_highlight_nothing() {
        for endpoint in [
            endpoints::ROOT,
            endpoints::LOG_IN_VIEW,
            endpoints::REGISTER_VIEW,
            endpoints::INTERNAL_ERROR_VIEW,
            endpoints::TRANSACTIONS_API,
        ] {
            assert!(current_links(endpoint).is_empty(), "{endpoint}");
        }
    }
}
