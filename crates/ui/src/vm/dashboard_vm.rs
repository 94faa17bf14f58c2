use services::{CategoryStat, DepartmentStat, Statistics, SurveyToken};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SummaryCardVm {
    pub label: &'static str,
    pub value: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DistributionBarVm {
    pub score: usize,
    pub count: u64,
    pub percent: u8,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DepartmentRowVm {
    pub department: String,
    pub satisfaction: String,
    pub responses: u64,
}

impl From<&DepartmentStat> for DepartmentRowVm {
    fn from(stat: &DepartmentStat) -> Self {
        Self {
            department: stat.department.clone(),
            satisfaction: format!("{:.1}", stat.satisfaction),
            responses: stat.responses,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CategoryRowVm {
    pub category: String,
    pub satisfaction: String,
    pub expectation: String,
    /// Expectation minus satisfaction; positive means room for improvement.
    pub gap: String,
}

impl From<&CategoryStat> for CategoryRowVm {
    fn from(stat: &CategoryStat) -> Self {
        Self {
            category: stat.category.clone(),
            satisfaction: format!("{:.1}", stat.satisfaction),
            expectation: format!("{:.1}", stat.expectation),
            gap: format!("{:+.1}", stat.expectation - stat.satisfaction),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrendBarVm {
    pub count: u64,
    pub height_percent: u8,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenRowVm {
    pub token: String,
    pub description: String,
    pub usage: String,
    pub expires_at: String,
    pub status: &'static str,
    pub can_disable: bool,
}

impl From<&SurveyToken> for TokenRowVm {
    fn from(token: &SurveyToken) -> Self {
        let status = if !token.is_active {
            "無効"
        } else if token.accepts_responses() {
            "有効"
        } else {
            "上限到達"
        };
        Self {
            token: token.token.clone(),
            description: token.description.clone().unwrap_or_default(),
            usage: format!("{} / {}", token.current_responses, token.max_responses),
            expires_at: token.expires_at.clone().unwrap_or_else(|| "-".to_string()),
            status,
            can_disable: token.is_active,
        }
    }
}

/// Statistics and tokens shaped for every dashboard role.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DashboardVm {
    pub cards: Vec<SummaryCardVm>,
    pub distribution: Vec<DistributionBarVm>,
    pub departments: Vec<DepartmentRowVm>,
    pub categories: Vec<CategoryRowVm>,
    pub trend: Vec<TrendBarVm>,
    pub tokens: Vec<TokenRowVm>,
}

impl DashboardVm {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.distribution.iter().all(|bar| bar.count == 0) && self.departments.is_empty()
    }
}

#[must_use]
pub fn map_dashboard(stats: &Statistics, tokens: &[SurveyToken]) -> DashboardVm {
    let cards = vec![
        SummaryCardVm {
            label: "総回答数",
            value: stats.total_responses.to_string(),
        },
        SummaryCardVm {
            label: "回答完了率",
            value: format!("{:.1}%", stats.completion_rate),
        },
        SummaryCardVm {
            label: "平均満足度",
            value: format!("{:.2}", stats.avg_satisfaction),
        },
        SummaryCardVm {
            label: "NPS",
            value: format!("{:.1}", stats.nps_score),
        },
    ];

    let distribution = stats
        .satisfaction_distribution
        .iter()
        .zip(stats.distribution_percentages())
        .enumerate()
        .map(|(idx, (count, percent))| DistributionBarVm {
            score: idx + 1,
            count: *count,
            percent,
        })
        .collect();

    let peak = stats.trend_peak();
    let trend = stats
        .response_trend
        .iter()
        .map(|count| TrendBarVm {
            count: *count,
            height_percent: if peak == 0 {
                0
            } else {
                u8::try_from(count * 100 / peak).unwrap_or(100)
            },
        })
        .collect();

    DashboardVm {
        cards,
        distribution,
        departments: stats.department_data.iter().map(DepartmentRowVm::from).collect(),
        categories: stats
            .category_satisfaction
            .iter()
            .map(CategoryRowVm::from)
            .collect(),
        trend,
        tokens: tokens.iter().map(TokenRowVm::from).collect(),
    }
}
