//! The standard employee-satisfaction survey.

use crate::labels::{LEAST_SATISFIED_KEY, MOST_EXPECTED_KEY, MOST_SATISFIED_KEY};
use crate::model::{
    FieldKind, FieldSpec, PageNumber, PageSpec, QuestionCategory, QuestionRegistry, RevealRule,
    ScoredQuestion, SurveyDefinition, SurveyDefinitionError,
};
use crate::scoring::{EXPECTATION_LABELS, SATISFACTION_LABELS};

/// Select value that reveals a free-text follow-up.
pub const OTHER_OPTION: &str = "その他";

/// Minimum length of the three rating follow-up answers.
pub const RATING_FOLLOW_UP_MIN_LENGTH: usize = 10;

/// `(satisfaction key, expectation key, display text)` for every rated workplace trait.
const RATED_ITEMS: [(&str, &str, &str); 28] = [
    ("vacation_satisfaction", "vacation_expectation", "有給休暇がちゃんと取れる職場"),
    ("flexible_work_satisfaction", "flexible_work_expectation", "時間や場所など働き方に柔軟性のある職場"),
    ("commute_satisfaction", "commute_expectation", "自宅から適切な距離で働ける職場"),
    ("overtime_pay_satisfaction", "overtime_pay_expectation", "残業したらその分しっかり給与が支払われる職場"),
    ("workload_satisfaction", "workload_expectation", "自分のキャパシティに合った量の仕事で働ける職場"),
    ("physical_load_satisfaction", "physical_load_expectation", "仕事内容や量に対する身体的な負荷が少ない職場"),
    ("mental_load_satisfaction", "mental_load_expectation", "仕事内容や量に対する精神的な負荷が少ない職場"),
    ("benefits_satisfaction", "benefits_expectation", "充実した福利厚生がある職場"),
    ("promotion_satisfaction", "promotion_expectation", "成果に応じて早期の昇給・昇格が望める職場"),
    ("fair_evaluation_satisfaction", "fair_evaluation_expectation", "自身の行った仕事が正当に評価される職場"),
    ("fair_salary_satisfaction", "fair_salary_expectation", "同年代や同じ能力の人と比べて妥当な給与がもらえる職場"),
    ("professional_skill_satisfaction", "professional_skill_expectation", "専門的なスキルや技術・知識や経験を獲得できる職場"),
    ("general_skill_satisfaction", "general_skill_expectation", "汎用的なスキル（コミュニケーション能力や論理的思考力など）や技術・知識・経験を獲得できる職場"),
    ("education_satisfaction", "education_expectation", "整った教育体制がある職場"),
    ("career_path_satisfaction", "career_path_expectation", "自分に合った将来のキャリアパスをしっかり設計している職場"),
    ("career_direction_satisfaction", "career_direction_expectation", "将来自分のなりたいもしくはやりたい方向性とマッチした仕事を任せてもらえる職場"),
    ("role_model_satisfaction", "role_model_expectation", "身近にロールモデルとなるような人がいる職場"),
    ("pride_satisfaction", "pride_expectation", "誇りやプライドを持てるような仕事内容を提供してくれる職場"),
    ("social_contribution_satisfaction", "social_contribution_expectation", "社会に対して貢献実感を持てるような仕事を任せてもらえる職場"),
    ("fulfillment_satisfaction", "fulfillment_expectation", "やりがいを感じられるような仕事を任せてもらえる職場"),
    ("autonomy_satisfaction", "autonomy_expectation", "自分の判断で進められる裁量のある仕事ができる職場"),
    ("relationship_satisfaction", "relationship_expectation", "人間関係が良好な職場"),
    ("harassment_prevention_satisfaction", "harassment_prevention_expectation", "セクハラやパワハラがないような職場"),
    ("open_communication_satisfaction", "open_communication_expectation", "意見や考え方などについて自由に言い合える風通しの良い職場"),
    ("company_stability_satisfaction", "company_stability_expectation", "事業基盤について安心感のある職場"),
    ("compliance_satisfaction", "compliance_expectation", "法令遵守が整った職場"),
    ("work_environment_satisfaction", "work_environment_expectation", "働きやすい仕事環境やオフィス環境の職場"),
    ("gender_friendly_satisfaction", "gender_friendly_expectation", "女性が働きやすい職場"),
];

/// Rated items per page, as `(title, range into RATED_ITEMS)`.
const RATED_PAGES: [(&str, std::ops::Range<usize>); 6] = [
    ("働き方・時間の柔軟性", 0..3),
    ("労働条件", 3..7),
    ("待遇・評価", 7..11),
    ("キャリア・スキル形成", 11..17),
    ("仕事内容・やりがい", 17..21),
    ("人間関係・組織・経営基盤", 21..28),
];

const DEPARTMENTS: [&str; 7] = [
    "営業部",
    "エンジニアリング部",
    "マーケティング部",
    "人事部",
    "経理部",
    "企画部",
    OTHER_OPTION,
];

const POSITIONS: [&str; 5] = ["ジュニア", "ミッド", "シニア", "マネージャー", "ディレクター"];

const EMPLOYMENT_TYPES: [&str; 4] = ["正社員", "契約社員", "派遣社員", "パート・アルバイト"];

const YEARS_OF_SERVICE: [&str; 5] = ["1年未満", "1〜3年", "3〜5年", "5〜10年", "10年以上"];

const AGE_GROUPS: [&str; 5] = ["20代以下", "30代", "40代", "50代", "60代以上"];

const GENDERS: [&str; 4] = ["男性", "女性", "その他", "回答しない"];

const INCOME_RANGES: [&str; 9] = [
    "300万円未満",
    "300万円以上400万円未満",
    "400万円以上500万円未満",
    "500万円以上600万円未満",
    "600万円以上700万円未満",
    "700万円以上800万円未満",
    "800万円以上900万円未満",
    "900万円以上1000万円未満",
    "1000万円以上",
];

const WEEKLY_HOURS: [&str; 5] = ["40時間未満", "40〜45時間", "45〜50時間", "50〜60時間", "60時間以上"];

/// Registry of every satisfaction and expectation question, satisfaction first.
#[must_use]
pub fn standard_registry() -> QuestionRegistry {
    let mut registry = QuestionRegistry::new();
    for (satisfaction, _, display) in RATED_ITEMS {
        registry.register(ScoredQuestion::new(
            satisfaction,
            QuestionCategory::Satisfaction,
            display,
        ));
    }
    for (_, expectation, display) in RATED_ITEMS {
        registry.register(ScoredQuestion::new(
            expectation,
            QuestionCategory::Expectation,
            display,
        ));
    }
    registry
}

/// The twelve-page employee survey.
///
/// # Errors
///
/// Returns `SurveyDefinitionError` only if the static tables are inconsistent.
pub fn employee_survey() -> Result<SurveyDefinition, SurveyDefinitionError> {
    let mut pages = vec![
        PageSpec::new(
            PageNumber::new(1),
            "所属",
            vec![
                FieldSpec::required("department", "所属部署", FieldKind::select(DEPARTMENTS)),
                FieldSpec::required(
                    "department_other",
                    "所属部署（その他）",
                    FieldKind::free_text(None),
                )
                .revealed_by(RevealRule::new("department", OTHER_OPTION)),
                FieldSpec::required("position", "役職", FieldKind::single_choice(POSITIONS)),
            ],
        ),
        PageSpec::new(
            PageNumber::new(2),
            "雇用形態",
            vec![
                FieldSpec::required(
                    "employment_type",
                    "雇用形態",
                    FieldKind::single_choice(EMPLOYMENT_TYPES),
                ),
                FieldSpec::required(
                    "years_of_service",
                    "勤続年数",
                    FieldKind::select(YEARS_OF_SERVICE),
                ),
            ],
        ),
        PageSpec::new(
            PageNumber::new(3),
            "回答者について",
            vec![
                FieldSpec::required("age_group", "年代", FieldKind::single_choice(AGE_GROUPS)),
                FieldSpec::optional("gender", "性別", FieldKind::single_choice(GENDERS)),
            ],
        ),
        PageSpec::new(
            PageNumber::new(4),
            "収入・勤務時間",
            vec![
                FieldSpec::required("annual_income", "年収", FieldKind::select(INCOME_RANGES)),
                FieldSpec::required(
                    "weekly_hours",
                    "1週間の平均労働時間",
                    FieldKind::select(WEEKLY_HOURS),
                ),
            ],
        ),
    ];

    for (title, range) in RATED_PAGES {
        let number = PageNumber::new(pages.len() + 1);
        let fields = RATED_ITEMS[range]
            .iter()
            .flat_map(|(satisfaction, expectation, display)| {
                [
                    FieldSpec::required(
                        *satisfaction,
                        format!("{display}（満足度）"),
                        FieldKind::single_choice(SATISFACTION_LABELS),
                    ),
                    FieldSpec::required(
                        *expectation,
                        format!("{display}（期待度）"),
                        FieldKind::single_choice(EXPECTATION_LABELS),
                    ),
                ]
            })
            .collect();
        pages.push(PageSpec::new(number, title, fields));
    }

    pages.push(PageSpec::new(
        PageNumber::new(pages.len() + 1),
        "総合評価",
        vec![
            FieldSpec::required(
                "overall_satisfaction",
                "現在の会社に対する総合的な満足度",
                FieldKind::single_choice(SATISFACTION_LABELS),
            ),
            FieldSpec::required(
                "recommendation",
                "友人や知人にこの会社を勧める可能性（0〜10）",
                FieldKind::single_choice((0..=10).map(|n| n.to_string())),
            ),
        ],
    ));

    pages.push(PageSpec::new(
        PageNumber::new(pages.len() + 1),
        "自由記述",
        vec![
            FieldSpec::required(
                MOST_SATISFIED_KEY,
                "最も満足度が高い項目について",
                FieldKind::free_text(Some(RATING_FOLLOW_UP_MIN_LENGTH)),
            ),
            FieldSpec::required(
                LEAST_SATISFIED_KEY,
                "最も満足度が低い項目について",
                FieldKind::free_text(Some(RATING_FOLLOW_UP_MIN_LENGTH)),
            ),
            FieldSpec::required(
                MOST_EXPECTED_KEY,
                "最も期待度が高い項目について",
                FieldKind::free_text(Some(RATING_FOLLOW_UP_MIN_LENGTH)),
            ),
            FieldSpec::optional(
                "other_comments",
                "その他ご意見・ご要望",
                FieldKind::free_text(None),
            ),
        ],
    ));

    SurveyDefinition::new(pages)
}
