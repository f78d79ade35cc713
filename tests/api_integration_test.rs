// ==========================================
// API 层集成测试
// ==========================================
// 测试目标: ProcurementApi 解析响应与订货指南批量解析
// 覆盖范围: 响应装配、本地化结论、协作式取消、结构性错误
// ==========================================

mod test_helpers;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use foodservice_costing::api::{ApiError, ProcurementApi};
use foodservice_costing::domain::types::{MarketSegment, ResolutionTier, Scope};
use test_helpers::*;

/// 搭建 ProcurementApi + 基础数据
fn setup(db_path: &str) -> (ProcurementApi, TestRepos) {
    let conn = open_test_connection(db_path).unwrap();
    let repos = build_repos(conn.clone());

    repos
        .ingredients
        .insert(&make_ingredient("ING001", "LB", Some("0.60"), Some("0.81")))
        .unwrap();
    repos
        .ingredients
        .insert(&make_ingredient("ING002", "LB", None, None))
        .unwrap();
    repos
        .sites
        .insert(&make_site("SITE001", "T001", MarketSegment::Education))
        .unwrap();

    let api_repos = build_repos(conn);
    (ProcurementApi::new(Arc::new(api_repos.specs)), repos)
}

#[test]
fn test_resolve_specification_site_tier_response() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let (api, repos) = setup(&db_path);

    repos
        .specs
        .insert_specification(&make_spec("SPEC-S", "ING001", Scope::Global, false))
        .unwrap();
    repos
        .specs
        .insert_site_preference(&make_site_pref(
            "P1",
            "SITE001",
            "ING001",
            "SPEC-S",
            Some("V001"),
            10,
            date(2024, 1, 1),
            None,
        ))
        .unwrap();

    let response = api
        .resolve_specification("ING001", "SITE001", date(2024, 6, 1))
        .unwrap();

    assert_eq!(response.tier, ResolutionTier::Site);
    assert_eq!(response.spec_id.as_deref(), Some("SPEC-S"));
    assert_eq!(response.spec_name.as_deref(), Some("规格-SPEC-S"));
    assert_eq!(response.vendor_id.as_deref(), Some("V001"));
    assert!(!response.needs_manual);
    assert!(!response.reasons.is_empty());
}

#[test]
fn test_resolve_specification_none_tier_is_success() {
    // 无任何采购数据: 成功响应 + needs_manual 提示, 不是错误
    let (_tmp, db_path) = create_test_db().unwrap();
    let (api, _repos) = setup(&db_path);

    let response = api
        .resolve_specification("ING002", "SITE001", date(2024, 6, 1))
        .unwrap();

    assert_eq!(response.tier, ResolutionTier::None);
    assert!(response.needs_manual);
    assert!(response.spec_id.is_none());
    assert!(response.message.contains("ING002"));
}

#[test]
fn test_resolve_specification_unknown_ids_are_hard_errors() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let (api, _repos) = setup(&db_path);

    let err = api
        .resolve_specification("GHOST", "SITE001", date(2024, 6, 1))
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));

    let err = api
        .resolve_specification("ING001", "NO-SITE", date(2024, 6, 1))
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}

#[test]
fn test_order_guide_preserves_input_order() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let (api, repos) = setup(&db_path);

    // ING001 命中细分市场默认; ING002 无数据 → NONE
    repos
        .specs
        .insert_segment_default(&make_segment_default(
            "D1",
            MarketSegment::Education,
            "ING001",
            "SPEC-SEG",
            1,
            date(2024, 1, 1),
            None,
        ))
        .unwrap();

    let never_cancelled = AtomicBool::new(false);
    let responses = api
        .build_order_guide(
            &["ING002".to_string(), "ING001".to_string()],
            "SITE001",
            date(2024, 6, 1),
            &never_cancelled,
        )
        .unwrap();

    assert_eq!(responses.len(), 2);
    assert_eq!(responses[0].ingredient_id, "ING002");
    assert_eq!(responses[0].tier, ResolutionTier::None);
    assert_eq!(responses[1].ingredient_id, "ING001");
    assert_eq!(responses[1].tier, ResolutionTier::Segment);
}

#[test]
fn test_order_guide_cancellation_stops_lookups() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let (api, _repos) = setup(&db_path);

    let cancelled = AtomicBool::new(true);
    let err = api
        .build_order_guide(
            &["ING001".to_string(), "ING002".to_string()],
            "SITE001",
            date(2024, 6, 1),
            &cancelled,
        )
        .unwrap_err();
    assert!(matches!(err, ApiError::Cancelled));

    // 未取消时同样的调用正常完成
    cancelled.store(false, Ordering::Relaxed);
    let responses = api
        .build_order_guide(
            &["ING001".to_string(), "ING002".to_string()],
            "SITE001",
            date(2024, 6, 1),
            &cancelled,
        )
        .unwrap();
    assert_eq!(responses.len(), 2);
}

#[test]
fn test_localized_message_follows_locale() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let (api, _repos) = setup(&db_path);

    foodservice_costing::i18n::set_locale("en");
    let response = api
        .resolve_specification("ING002", "SITE001", date(2024, 6, 1))
        .unwrap();
    assert!(response.message.contains("manual"));

    foodservice_costing::i18n::set_locale("zh-CN");
    let response = api
        .resolve_specification("ING002", "SITE001", date(2024, 6, 1))
        .unwrap();
    assert!(response.message.contains("人工"));
}
