// ==========================================
// 日计划同步集成测试
// ==========================================
// 测试范围:
// 1. 同步幂等、空列表清空
// 2. 解析失败 / 存储失败时原计划保持不变
// 3. 批次校验（车间一致、ID 不重复、数量上限）
// 4. Sync -> GetPlanning -> Sync([]) -> GetPlanning 全流程
// 5. 班次引用校验、其他车间/租户明细不被改写
// ==========================================

mod helpers;

use chrono::NaiveDate;
use helpers::api_test_helper::*;
use shopfloor_planner::api::{ApiError, ScheduleEntryRequest};
use shopfloor_planner::config::{config_keys, ConfigScope};
use shopfloor_planner::domain::ScheduleEntry;
use uuid::Uuid;

struct SyncFixture {
    env: ApiTestEnv,
    customer: Uuid,
    floor: Uuid,
    shift_id: Uuid,
}

fn setup() -> SyncFixture {
    let env = ApiTestEnv::new().expect("无法创建测试环境");
    let customer = Uuid::new_v4();
    let floor = Uuid::new_v4();
    let shift = env.create_active_shift(customer, Some(floor), "Morning", "06:00", "14:00");
    SyncFixture {
        env,
        customer,
        floor,
        shift_id: shift.id,
    }
}

impl SyncFixture {
    fn request(&self, order: i32) -> ScheduleEntryRequest {
        let mut req = entry_request(self.customer, self.floor, self.shift_id, "", order);
        req.date = None;
        req
    }

    fn planning(&self, date: &str) -> Vec<ScheduleEntry> {
        self.env
            .schedule_api
            .get_planning(&self.floor.to_string(), date)
            .expect("查询日计划失败")
    }
}

/// 去掉时间戳后的可比较视图
fn plan_view(entries: &[ScheduleEntry]) -> Vec<(Uuid, Uuid, Option<Uuid>, NaiveDate, i32, bool)> {
    entries
        .iter()
        .map(|e| (e.id, e.shift_id, e.operator_id, e.date, e.order, e.is_completed))
        .collect()
}

#[test]
fn test_sync_幂等() {
    let f = setup();
    let operator = Uuid::new_v4();

    let mut first = f.request(0);
    first.id = Some(Uuid::new_v4().to_string());
    first.operator_id = Some(operator.to_string());
    let mut second = f.request(1);
    second.id = Some(Uuid::new_v4().to_string());
    let batch = vec![first, second];

    let count = f
        .env
        .schedule_api
        .sync_planning(&f.floor.to_string(), "2024-06-03", &batch)
        .expect("同步失败");
    assert_eq!(count, 2);
    let once = plan_view(&f.planning("2024-06-03"));

    let count = f
        .env
        .schedule_api
        .sync_planning(&f.floor.to_string(), "2024-06-03", &batch)
        .expect("同步失败");
    assert_eq!(count, 2);
    let twice = plan_view(&f.planning("2024-06-03"));

    assert_eq!(once, twice);
    assert_eq!(twice[0].2, Some(operator));
}

#[test]
fn test_sync_日期强制为同步日期() {
    let f = setup();

    let mut req = f.request(0);
    req.date = Some("2030-01-01".to_string());
    let mut malformed_date = f.request(1);
    malformed_date.date = Some("not-a-date".to_string());

    f.env
        .schedule_api
        .sync_planning(
            &f.floor.to_string(),
            "2024-06-03T22:30:00-03:00",
            &[req, malformed_date],
        )
        .expect("同步失败");

    let plan = f.planning("2024-06-03");
    assert_eq!(plan.len(), 2);
    assert!(plan
        .iter()
        .all(|e| e.date == NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()));
    assert!(f.planning("2030-01-01").is_empty());
}

#[test]
fn test_sync_非法ID生成新ID() {
    let f = setup();

    let mut req = f.request(0);
    req.id = Some("legacy-17".to_string());
    f.env
        .schedule_api
        .sync_planning(&f.floor.to_string(), "2024-06-03", &[req])
        .expect("同步失败");

    let plan = f.planning("2024-06-03");
    assert_eq!(plan.len(), 1);
    assert_ne!(plan[0].id, Uuid::nil());
}

#[test]
fn test_sync_空列表清空当日() {
    let f = setup();

    f.env
        .schedule_api
        .sync_planning(&f.floor.to_string(), "2024-06-03", &[f.request(0), f.request(1)])
        .unwrap();
    f.env
        .schedule_api
        .sync_planning(&f.floor.to_string(), "2024-06-04", &[f.request(0)])
        .unwrap();

    let count = f
        .env
        .schedule_api
        .sync_planning(&f.floor.to_string(), "2024-06-03", &[])
        .unwrap();
    assert_eq!(count, 0);
    assert!(f.planning("2024-06-03").is_empty());
    assert_eq!(f.planning("2024-06-04").len(), 1, "其他日期不受影响");
}

#[test]
fn test_sync_解析失败保持原计划() {
    let f = setup();

    f.env
        .schedule_api
        .sync_planning(&f.floor.to_string(), "2024-06-03", &[f.request(0)])
        .unwrap();
    let before = plan_view(&f.planning("2024-06-03"));

    let mut bad = f.request(1);
    bad.shift_id = Some("night".to_string());
    let result = f.env.schedule_api.sync_planning(
        &f.floor.to_string(),
        "2024-06-03",
        &[f.request(0), bad],
    );
    match result {
        Err(ApiError::ParseError { field, .. }) => assert_eq!(field, "shift_id"),
        other => panic!("Expected ParseError, got {:?}", other),
    }

    assert_eq!(plan_view(&f.planning("2024-06-03")), before);

    assert!(matches!(
        f.env
            .schedule_api
            .sync_planning("floor-1", "2024-06-03", &[]),
        Err(ApiError::ParseError { .. })
    ));
    assert!(matches!(
        f.env
            .schedule_api
            .sync_planning(&f.floor.to_string(), "June 3rd", &[]),
        Err(ApiError::ParseError { .. })
    ));
}

#[test]
fn test_sync_存储失败整体回滚() {
    let f = setup();

    f.env
        .schedule_api
        .sync_planning(&f.floor.to_string(), "2024-06-03", &[f.request(0)])
        .unwrap();
    let before = plan_view(&f.planning("2024-06-03"));

    let poisoned_id = Uuid::new_v4();
    {
        let conn = f.env.conn.lock().unwrap();
        conn.execute_batch(&format!(
            r#"
            CREATE TRIGGER fail_poisoned BEFORE INSERT ON schedule_entries
            WHEN NEW.id = '{}'
            BEGIN
                SELECT RAISE(ABORT, 'simulated store failure');
            END;
            "#,
            poisoned_id
        ))
        .unwrap();
    }

    let mut poisoned = f.request(2);
    poisoned.id = Some(poisoned_id.to_string());
    let result = f.env.schedule_api.sync_planning(
        &f.floor.to_string(),
        "2024-06-03",
        &[f.request(0), f.request(1), poisoned],
    );
    assert!(result.is_err());

    assert_eq!(plan_view(&f.planning("2024-06-03")), before);
}

#[test]
fn test_sync_批次校验() {
    let f = setup();

    // 车间不一致
    let mut foreign = f.request(0);
    foreign.shopfloor_id = Some(Uuid::new_v4().to_string());
    assert!(matches!(
        f.env
            .schedule_api
            .sync_planning(&f.floor.to_string(), "2024-06-03", &[foreign]),
        Err(ApiError::InvalidInput(_))
    ));

    // ID 重复
    let id = Uuid::new_v4().to_string();
    let mut a = f.request(0);
    a.id = Some(id.clone());
    let mut b = f.request(1);
    b.id = Some(id);
    assert!(matches!(
        f.env
            .schedule_api
            .sync_planning(&f.floor.to_string(), "2024-06-03", &[a, b]),
        Err(ApiError::InvalidInput(_))
    ));

    // 超过租户级上限
    f.env
        .config_manager
        .set_config_value(
            &ConfigScope::Customer {
                customer_id: f.customer,
            },
            config_keys::SCHEDULE_SYNC_MAX_ENTRIES,
            "2",
        )
        .unwrap();
    let batch: Vec<ScheduleEntryRequest> = (0..3).map(|i| f.request(i)).collect();
    assert!(matches!(
        f.env
            .schedule_api
            .sync_planning(&f.floor.to_string(), "2024-06-03", &batch),
        Err(ApiError::InvalidInput(_))
    ));

    assert!(f.planning("2024-06-03").is_empty());
}

#[test]
fn test_sync_查询_清空_查询全流程() {
    let f = setup();
    let floor = f.floor.to_string();

    let batch = vec![f.request(2), f.request(0), f.request(1)];
    let count = f
        .env
        .schedule_api
        .sync_planning(&floor, "2024-06-03", &batch)
        .expect("同步失败");
    assert_eq!(count, 3);

    let plan = f.planning("2024-06-03");
    let orders: Vec<i32> = plan.iter().map(|e| e.order).collect();
    assert_eq!(orders, vec![0, 1, 2]);
    assert!(plan.iter().all(|e| e.shopfloor_id == f.floor));

    let count = f
        .env
        .schedule_api
        .sync_planning(&floor, "2024-06-03", &[])
        .expect("同步失败");
    assert_eq!(count, 0);
    assert!(f.planning("2024-06-03").is_empty());
}

#[test]
fn test_sync_不得改写其他车间或租户的明细() {
    let f = setup();

    // 另一租户在另一车间的既有计划
    let other_customer = Uuid::new_v4();
    let other_floor = Uuid::new_v4();
    let other_shift =
        f.env
            .create_active_shift(other_customer, Some(other_floor), "Day", "08:00", "16:00");
    let victim = f
        .env
        .schedule_api
        .create_entry(&entry_request(
            other_customer,
            other_floor,
            other_shift.id,
            "2024-05-01",
            0,
        ))
        .expect("创建明细失败");

    f.env
        .schedule_api
        .sync_planning(&f.floor.to_string(), "2024-06-01", &[f.request(0)])
        .unwrap();
    let before = plan_view(&f.planning("2024-06-01"));

    let mut hijack = f.request(1);
    hijack.id = Some(victim.id.to_string());
    let result = f.env.schedule_api.sync_planning(
        &f.floor.to_string(),
        "2024-06-01",
        &[f.request(0), hijack],
    );
    assert!(result.is_err(), "复用其他计划的明细ID应失败: {:?}", result);

    let kept = f.env.schedule_api.get_entry(&victim.id.to_string()).unwrap();
    assert_eq!(kept, victim);
    let other_plan = f
        .env
        .schedule_api
        .get_planning(&other_floor.to_string(), "2024-05-01")
        .unwrap();
    assert_eq!(other_plan.len(), 1);
    assert_eq!(plan_view(&f.planning("2024-06-01")), before);
}

#[test]
fn test_sync_可复用当日明细ID() {
    let f = setup();

    f.env
        .schedule_api
        .sync_planning(&f.floor.to_string(), "2024-06-03", &[f.request(0)])
        .unwrap();
    let existing = f.planning("2024-06-03").remove(0);

    let mut reused = f.request(7);
    reused.id = Some(existing.id.to_string());
    f.env
        .schedule_api
        .sync_planning(&f.floor.to_string(), "2024-06-03", &[reused])
        .expect("同一车间同一日期内复用ID应成功");

    let plan = f.planning("2024-06-03");
    assert_eq!(plan.len(), 1);
    assert_eq!(plan[0].id, existing.id);
    assert_eq!(plan[0].order, 7);
}

#[test]
fn test_sync_班次须存在且启用() {
    let f = setup();

    f.env
        .schedule_api
        .sync_planning(&f.floor.to_string(), "2024-06-03", &[f.request(0)])
        .unwrap();
    let before = plan_view(&f.planning("2024-06-03"));

    // 班次不存在
    let mut missing = f.request(1);
    missing.shift_id = Some(Uuid::new_v4().to_string());
    assert!(matches!(
        f.env.schedule_api.sync_planning(
            &f.floor.to_string(),
            "2024-06-03",
            &[f.request(0), missing]
        ),
        Err(ApiError::NotFound(_))
    ));

    // 班次已停用
    let mut req = shift_request(f.customer, Some(f.floor), "Old", "14:00", "22:00");
    req.is_active = false;
    let old = f.env.shift_api.create_shift(&req).unwrap();
    let mut inactive = f.request(1);
    inactive.shift_id = Some(old.id.to_string());
    assert!(matches!(
        f.env.schedule_api.sync_planning(
            &f.floor.to_string(),
            "2024-06-03",
            &[f.request(0), inactive]
        ),
        Err(ApiError::BusinessRuleViolation(_))
    ));

    assert_eq!(plan_view(&f.planning("2024-06-03")), before);
}

#[test]
fn test_sync_先解析后校验上限() {
    let f = setup();

    f.env
        .config_manager
        .set_config_value(
            &ConfigScope::Customer {
                customer_id: f.customer,
            },
            config_keys::SCHEDULE_SYNC_MAX_ENTRIES,
            "1",
        )
        .unwrap();

    // 超出上限且含格式错误：报告解析错误
    let mut bad = f.request(1);
    bad.operator_id = Some("op-7".to_string());
    match f.env.schedule_api.sync_planning(
        &f.floor.to_string(),
        "2024-06-03",
        &[f.request(0), bad],
    ) {
        Err(ApiError::ParseError { field, .. }) => assert_eq!(field, "operator_id"),
        other => panic!("Expected ParseError, got {:?}", other),
    }

    // 上限按批次内所有租户取最小值，不只看第一条
    let other_customer = Uuid::new_v4();
    let mut foreign_tenant = f.request(1);
    foreign_tenant.customer_id = Some(other_customer.to_string());
    let batch = vec![foreign_tenant, f.request(0)];
    assert!(matches!(
        f.env
            .schedule_api
            .sync_planning(&f.floor.to_string(), "2024-06-03", &batch),
        Err(ApiError::InvalidInput(_))
    ));

    assert!(f.planning("2024-06-03").is_empty());
}
