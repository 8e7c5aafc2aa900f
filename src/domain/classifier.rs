//! Keyword-driven analysis used when no generative backend answers.
//!
//! File extensions become technology tags and path segments are matched
//! against a table of business-domain keywords. Line counts are summed per
//! domain and the busiest domains become achievement lines. Every step has a
//! default, so classification cannot fail.

use std::collections::BTreeMap;

use crate::domain::analysis::{
    AggregateAnalysis, AnalysisOrigin, MAX_IMPACT_SCORE, RepositoryAchievements,
};
use crate::domain::commit::{CommitRecord, RepositoryCommitSet};

const TOP_ACHIEVEMENTS: usize = 5;
const SUMMARY_DOMAINS: usize = 3;
const MAX_TECHNOLOGIES: usize = 6;
const INSERTIONS_PER_IMPACT_POINT: u64 = 200;

pub const NO_DOMAIN_SUMMARY: &str = "General code changes";
pub const NO_ACHIEVEMENTS: &str = "See the commit log for details";

#[derive(Debug, Clone, Copy)]
pub struct DomainKeyword {
    pub keyword: &'static str,
    pub label: &'static str,
}

/// Lookup tables the classifier reads. Order matters: the first matching
/// extension and the first matching keyword win.
#[derive(Debug, Clone, Copy)]
pub struct ClassifierTables {
    pub extensions: &'static [(&'static str, &'static str)],
    pub framework_markers: &'static [&'static str],
    pub framework_tag: &'static str,
    pub test_marker: &'static str,
    pub test_tag: &'static str,
    pub domains: &'static [DomainKeyword],
}

pub static DEFAULT_EXTENSIONS: &[(&str, &str)] = &[
    (".kt", "Kotlin"),
    (".java", "Java"),
    (".ts", "TypeScript"),
    (".tsx", "TypeScript"),
    (".py", "Python"),
    (".rs", "Rust"),
    (".go", "Go"),
    (".js", "JavaScript"),
    (".jsx", "JavaScript"),
];

pub static DEFAULT_DOMAINS: &[DomainKeyword] = &[
    DomainKeyword {
        keyword: "user",
        label: "User",
    },
    DomainKeyword {
        keyword: "order",
        label: "Order",
    },
    DomainKeyword {
        keyword: "product",
        label: "Product",
    },
    DomainKeyword {
        keyword: "payment",
        label: "Payment",
    },
    DomainKeyword {
        keyword: "auth",
        label: "Authentication",
    },
    DomainKeyword {
        keyword: "consultation",
        label: "Consultation",
    },
    DomainKeyword {
        keyword: "category",
        label: "Category",
    },
    DomainKeyword {
        keyword: "admin",
        label: "Admin",
    },
    DomainKeyword {
        keyword: "api",
        label: "API",
    },
    DomainKeyword {
        keyword: "dashboard",
        label: "Dashboard",
    },
    DomainKeyword {
        keyword: "fittem",
        label: "Fittem",
    },
    DomainKeyword {
        keyword: "diagnosis",
        label: "Diagnosis",
    },
    DomainKeyword {
        keyword: "ga",
        label: "GA analytics",
    },
    DomainKeyword {
        keyword: "analytics",
        label: "Analytics",
    },
];

impl Default for ClassifierTables {
    fn default() -> Self {
        Self {
            extensions: DEFAULT_EXTENSIONS,
            framework_markers: &["spring", "boot"],
            framework_tag: "Spring Boot",
            test_marker: "test",
            test_tag: "Tests",
            domains: DEFAULT_DOMAINS,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FallbackClassifier {
    tables: ClassifierTables,
}

impl FallbackClassifier {
    pub fn new(tables: ClassifierTables) -> Self {
        Self { tables }
    }

    pub fn classify(&self, sets: &[RepositoryCommitSet]) -> AggregateAnalysis {
        let mut overall = Tally::default();
        let mut per_repository = BTreeMap::new();

        for set in sets {
            let mut repo_tally = Tally::default();
            for commit in set.commits.iter().filter(|commit| !commit.is_merge()) {
                overall.record(commit, &self.tables);
                repo_tally.record(commit, &self.tables);
            }
            if repo_tally.commits > 0 {
                per_repository
                    .entry(set.display_name.clone())
                    .and_modify(|existing: &mut RepositoryAchievements| {
                        existing.achievements.extend(repo_tally.achievements());
                        for tag in &repo_tally.technologies {
                            push_unique(&mut existing.technologies, tag);
                        }
                    })
                    .or_insert_with(|| RepositoryAchievements {
                        achievements: repo_tally.achievements(),
                        technologies: repo_tally.technologies.clone(),
                    });
            }
        }

        let key_achievements = match overall.achievements() {
            list if list.is_empty() => vec![NO_ACHIEVEMENTS.to_string()],
            list => list,
        };

        AggregateAnalysis {
            summary: overall.summary(),
            per_repository_achievements: per_repository,
            key_achievements,
            technologies: overall
                .technologies
                .iter()
                .take(MAX_TECHNOLOGIES)
                .cloned()
                .collect(),
            impact_score: impact_score(overall.commits, overall.insertions),
            business_value: format!(
                "{} commits, {} lines added",
                overall.commits, overall.insertions
            ),
            origin: AnalysisOrigin::Fallback { reason: None },
        }
    }
}

/// Saturating score: one point per commit plus one per 200 inserted lines.
pub fn impact_score(commits: usize, insertions: u64) -> u8 {
    let raw = (commits as u64).saturating_add(insertions / INSERTIONS_PER_IMPACT_POINT);
    raw.min(u64::from(MAX_IMPACT_SCORE)) as u8
}

#[derive(Debug)]
struct DomainTotals {
    label: &'static str,
    insertions: u64,
    deletions: u64,
}

#[derive(Debug, Default)]
struct Tally {
    commits: usize,
    insertions: u64,
    deletions: u64,
    technologies: Vec<String>,
    // first-seen order
    domains: Vec<DomainTotals>,
}

impl Tally {
    fn record(&mut self, commit: &CommitRecord, tables: &ClassifierTables) {
        self.commits += 1;
        self.insertions += commit.insertions;
        self.deletions += commit.deletions;

        for path in &commit.changed_files {
            let lowered = path.to_lowercase();
            for tag in technology_tags(&lowered, tables) {
                push_unique(&mut self.technologies, tag);
            }
            if let Some(domain) = match_domain(&lowered, tables) {
                self.attribute(domain, commit);
            }
        }
    }

    fn attribute(&mut self, domain: &DomainKeyword, commit: &CommitRecord) {
        let index = match self.domains.iter().position(|d| d.label == domain.label) {
            Some(index) => index,
            None => {
                self.domains.push(DomainTotals {
                    label: domain.label,
                    insertions: 0,
                    deletions: 0,
                });
                self.domains.len() - 1
            }
        };
        let totals = &mut self.domains[index];
        totals.insertions += commit.insertions;
        totals.deletions += commit.deletions;
    }

    fn achievements(&self) -> Vec<String> {
        let mut ranked: Vec<&DomainTotals> = self.domains.iter().collect();
        // stable: ties keep first-seen order
        ranked.sort_by(|a, b| b.insertions.cmp(&a.insertions));
        ranked
            .into_iter()
            .take(TOP_ACHIEVEMENTS)
            .map(|d| {
                format!(
                    "{} feature work (+{}/-{} lines)",
                    d.label, d.insertions, d.deletions
                )
            })
            .collect()
    }

    fn summary(&self) -> String {
        if self.domains.is_empty() {
            return NO_DOMAIN_SUMMARY.to_string();
        }
        let labels: Vec<&str> = self
            .domains
            .iter()
            .take(SUMMARY_DOMAINS)
            .map(|d| d.label)
            .collect();
        format!("Worked on {}", labels.join(", "))
    }
}

fn technology_tags<'t>(lowered_path: &str, tables: &'t ClassifierTables) -> Vec<&'t str> {
    let mut tags = Vec::new();
    if let Some((_, tag)) = tables
        .extensions
        .iter()
        .find(|(ext, _)| lowered_path.ends_with(ext))
    {
        tags.push(*tag);
    }
    if tables
        .framework_markers
        .iter()
        .any(|marker| lowered_path.contains(marker))
    {
        tags.push(tables.framework_tag);
    }
    if lowered_path.contains(tables.test_marker) {
        tags.push(tables.test_tag);
    }
    tags
}

/// First segment containing a keyword decides the domain for the whole path.
fn match_domain<'t>(
    lowered_path: &str,
    tables: &'t ClassifierTables,
) -> Option<&'t DomainKeyword> {
    lowered_path.split('/').find_map(|segment| {
        tables
            .domains
            .iter()
            .find(|domain| segment.contains(domain.keyword))
    })
}

fn push_unique(list: &mut Vec<String>, tag: &str) {
    if !list.iter().any(|existing| existing == tag) {
        list.push(tag.to_string());
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use chrono::DateTime;

    use super::*;
    use crate::domain::commit::{CommitHeader, LineStats};

    fn commit(message: &str, files: &[&str], insertions: u64, deletions: u64) -> CommitRecord {
        CommitRecord::new(
            CommitHeader {
                id: format!("id-{message}"),
                author: "Dana".to_string(),
                timestamp: DateTime::parse_from_rfc3339("2024-03-05T10:00:00+09:00").unwrap(),
                message: message.to_string(),
            },
            files.iter().map(|f| f.to_string()).collect(),
            LineStats {
                insertions,
                deletions,
            },
            "",
        )
    }

    fn repo(name: &str, commits: Vec<CommitRecord>) -> RepositoryCommitSet {
        RepositoryCommitSet {
            path: PathBuf::from(format!("/work/{name}")),
            display_name: name.to_string(),
            remote_url: None,
            commits,
        }
    }

    #[test]
    fn merge_commits_are_ignored_everywhere() {
        let sets = vec![repo(
            "shop",
            vec![
                commit("Merge branch x", &["auth/Login.kt"], 500, 50),
                commit("fix: auth bug", &["auth/Login.kt"], 12, 3),
            ],
        )];

        let analysis = FallbackClassifier::default().classify(&sets);

        assert_eq!(
            analysis.key_achievements,
            vec!["Authentication feature work (+12/-3 lines)".to_string()]
        );
        assert_eq!(analysis.business_value, "1 commits, 12 lines added");
        assert_eq!(analysis.impact_score, 1);
        assert_eq!(analysis.technologies, vec!["Kotlin".to_string()]);
    }

    #[test]
    fn ranks_domains_by_insertions_but_summarises_in_first_seen_order() {
        let sets = vec![repo(
            "shop",
            vec![
                commit("payment tweak", &["payment/Pay.kt"], 10, 1),
                commit("order flow", &["order/Order.kt"], 300, 20),
                commit("admin page", &["admin/Page.tsx"], 50, 0),
                commit("order retry", &["order/Retry.kt"], 40, 2),
            ],
        )];

        let analysis = FallbackClassifier::default().classify(&sets);

        assert_eq!(
            analysis.key_achievements,
            vec![
                "Order feature work (+340/-22 lines)".to_string(),
                "Admin feature work (+50/-0 lines)".to_string(),
                "Payment feature work (+10/-1 lines)".to_string(),
            ]
        );
        assert_eq!(analysis.summary, "Worked on Payment, Order, Admin");
    }

    #[test]
    fn first_matching_segment_wins_per_path() {
        let sets = vec![repo(
            "shop",
            vec![commit("user orders", &["user/order/History.kt"], 8, 0)],
        )];

        let analysis = FallbackClassifier::default().classify(&sets);

        assert_eq!(
            analysis.key_achievements,
            vec!["User feature work (+8/-0 lines)".to_string()]
        );
    }

    #[test]
    fn counts_a_commit_once_per_matching_file() {
        let sets = vec![repo(
            "shop",
            vec![commit(
                "order list",
                &["order/List.kt", "order/Item.kt", "README.md"],
                40,
                2,
            )],
        )];

        let analysis = FallbackClassifier::default().classify(&sets);

        assert_eq!(
            analysis.key_achievements,
            vec!["Order feature work (+80/-4 lines)".to_string()]
        );
        assert_eq!(analysis.business_value, "1 commits, 40 lines added");
    }

    #[test]
    fn one_commit_can_feed_several_domains() {
        let sets = vec![repo(
            "shop",
            vec![commit(
                "checkout",
                &["order/Checkout.kt", "payment/Charge.kt"],
                30,
                5,
            )],
        )];

        let analysis = FallbackClassifier::default().classify(&sets);

        assert_eq!(analysis.key_achievements.len(), 2);
        assert_eq!(analysis.summary, "Worked on Order, Payment");
    }

    #[test]
    fn keeps_only_top_five_domains() {
        let files = [
            "user/a.kt",
            "order/a.kt",
            "product/a.kt",
            "payment/a.kt",
            "auth/a.kt",
            "admin/a.kt",
        ];
        let commits = files
            .iter()
            .enumerate()
            .map(|(i, f)| commit(&format!("c{i}"), &[f], (i as u64 + 1) * 10, 0))
            .collect();

        let analysis = FallbackClassifier::default().classify(&[repo("shop", commits)]);

        assert_eq!(analysis.key_achievements.len(), 5);
        assert!(analysis.key_achievements[0].starts_with("Admin"));
        assert!(!analysis.key_achievements.iter().any(|a| a.starts_with("User")));
    }

    #[test]
    fn unmatched_paths_use_generic_wording() {
        let sets = vec![repo("tools", vec![commit("docs", &["README.md"], 4, 1)])];

        let analysis = FallbackClassifier::default().classify(&sets);

        assert_eq!(analysis.summary, NO_DOMAIN_SUMMARY);
        assert_eq!(analysis.key_achievements, vec![NO_ACHIEVEMENTS.to_string()]);
        assert!(analysis.technologies.is_empty());
        assert_eq!(analysis.fallback_reason(), None);
        assert!(!analysis.is_generated());
    }

    #[test]
    fn empty_input_is_total() {
        let analysis = FallbackClassifier::default().classify(&[]);
        assert_eq!(analysis.impact_score, 0);
        assert_eq!(analysis.business_value, "0 commits, 0 lines added");
        assert!(analysis.per_repository_achievements.is_empty());
    }

    #[test]
    fn tags_languages_frameworks_and_tests_once() {
        let sets = vec![repo(
            "svc",
            vec![
                commit(
                    "boot",
                    &[
                        "src/main/kotlin/spring/App.kt",
                        "src/test/kotlin/AppTest.kt",
                        "web/App.tsx",
                        "web/util.ts",
                    ],
                    1,
                    0,
                ),
                commit("more", &["src/main/kotlin/Other.kt"], 1, 0),
            ],
        )];

        let analysis = FallbackClassifier::default().classify(&sets);

        assert_eq!(
            analysis.technologies,
            vec![
                "Kotlin".to_string(),
                "Spring Boot".to_string(),
                "Tests".to_string(),
                "TypeScript".to_string(),
            ]
        );
    }

    #[test]
    fn impact_score_saturates_and_never_decreases() {
        assert_eq!(impact_score(0, 0), 0);
        assert_eq!(impact_score(3, 450), 5);
        assert_eq!(impact_score(50, 100_000), MAX_IMPACT_SCORE);
        assert_eq!(impact_score(usize::MAX, u64::MAX), MAX_IMPACT_SCORE);

        let mut previous = 0;
        for commits in 0..12 {
            for insertions in (0..3000).step_by(150) {
                let score = impact_score(commits, insertions);
                assert!(score >= impact_score(commits.saturating_sub(1), insertions));
                assert!(score >= impact_score(commits, insertions.saturating_sub(150)));
                previous = previous.max(score);
            }
        }
        assert_eq!(previous, MAX_IMPACT_SCORE);
    }

    #[test]
    fn splits_achievements_per_repository() {
        let sets = vec![
            repo("shop", vec![commit("order", &["order/A.kt"], 20, 0)]),
            repo(
                "admin-ui",
                vec![commit("page", &["pages/dashboard/Home.tsx"], 5, 1)],
            ),
            repo(
                "quiet",
                vec![commit("Merge pull request #3", &["order/A.kt"], 9, 9)],
            ),
        ];

        let analysis = FallbackClassifier::default().classify(&sets);

        assert_eq!(analysis.per_repository_achievements.len(), 2);
        let shop = &analysis.per_repository_achievements["shop"];
        assert_eq!(
            shop.achievements,
            vec!["Order feature work (+20/-0 lines)".to_string()]
        );
        assert_eq!(shop.technologies, vec!["Kotlin".to_string()]);
        let admin = &analysis.per_repository_achievements["admin-ui"];
        assert_eq!(
            admin.achievements,
            vec!["Dashboard feature work (+5/-1 lines)".to_string()]
        );
    }

    #[test]
    fn accepts_substituted_tables() {
        static DOMAINS: &[DomainKeyword] = &[DomainKeyword {
            keyword: "billing",
            label: "Billing",
        }];
        static EXTENSIONS: &[(&str, &str)] = &[(".rb", "Ruby")];
        let tables = ClassifierTables {
            extensions: EXTENSIONS,
            framework_markers: &["rails"],
            framework_tag: "Rails",
            test_marker: "spec",
            test_tag: "Specs",
            domains: DOMAINS,
        };
        let sets = vec![repo(
            "app",
            vec![commit(
                "invoice",
                &["app/billing/invoice.rb", "order/x.kt", "spec/rails_helper.rb"],
                7,
                2,
            )],
        )];

        let analysis = FallbackClassifier::new(tables).classify(&sets);

        assert_eq!(
            analysis.key_achievements,
            vec!["Billing feature work (+7/-2 lines)".to_string()]
        );
        assert_eq!(
            analysis.technologies,
            vec!["Ruby".to_string(), "Rails".to_string(), "Specs".to_string()]
        );
    }
}
