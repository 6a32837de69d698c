use criterion::{Criterion, black_box, criterion_group, criterion_main};

use rihla_auth::{
    AccessPolicy, DefaultPolicy, Permission, PermissionCatalog, Principal, Role, UserRecord,
    UserStatus,
};
use rihla_core::UserId;

fn bench_can_access_section(c: &mut Criterion) {
    let catalog = PermissionCatalog::standard();
    let policy = AccessPolicy::new(&catalog, DefaultPolicy::DenyByDefault);

    let id = UserId::parse("bench").unwrap();
    let mut record = UserRecord::new(id, "bench@agency.example", "Bench");
    record.status = UserStatus::Active;
    record.role = Some(Role::BookingAgent);
    record.job_title = Some("محاسب".to_string());
    record.permissions = vec![Permission::from_static("view_reports")];

    let user = Principal::resolve(&record, &catalog);
    let sections: Vec<String> = catalog.sections().sections().map(String::from).collect();

    c.bench_function("can_access_section/all_sections", |b| {
        b.iter(|| {
            for section in &sections {
                black_box(policy.can_access_section(Some(black_box(&user)), section));
            }
        })
    });

    c.bench_function("principal/resolve", |b| {
        b.iter(|| black_box(Principal::resolve(black_box(&record), &catalog)))
    });
}

criterion_group!(benches, bench_can_access_section);
criterion_main!(benches);
