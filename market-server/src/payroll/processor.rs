//! Seller staff and payroll runs
//!
//! A staff member carries a fixed salary, an hourly rate, or both (at
//! least one); when both are set, payroll pays the salary. A processed
//! run is immutable; corrections happen in a subsequent run.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use rust_decimal::Decimal;
use shared::{
    PayrollPeriod, PayrollRun, PayrollStatus, Payslip, ProcessPayrollRequest, Staff, StaffCreate,
    StaffStatus, StaffUpdate,
};
use tracing::info;
use uuid::Uuid;

use crate::money::round_money;

#[derive(Debug, thiserror::Error)]
pub enum PayrollError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("validation failed: {0}")]
    Validation(String),
}

pub type PayrollResult<T> = Result<T, PayrollError>;

const WEEKS_PER_MONTH: u32 = 4;

#[derive(Default)]
pub struct PayrollService {
    staff: RwLock<HashMap<String, Staff>>,
    runs: RwLock<HashMap<String, PayrollRun>>,
}

impl PayrollService {
    pub fn new() -> Self {
        Self::default()
    }

    // ========== Staff directory ==========

    pub fn create_staff(&self, req: StaffCreate) -> PayrollResult<Staff> {
        if req.name.trim().is_empty() || req.seller_id.trim().is_empty() {
            return Err(PayrollError::Validation(
                "name and sellerId are required".to_string(),
            ));
        }
        validate_compensation(req.salary, req.hourly_rate)?;

        let staff = Staff {
            id: Uuid::new_v4().to_string(),
            seller_id: req.seller_id,
            name: req.name.trim().to_string(),
            department: req.department,
            role: req.role,
            status: StaffStatus::Active,
            salary: req.salary,
            hourly_rate: req.hourly_rate,
            created_at: Utc::now(),
        };
        self.staff.write().insert(staff.id.clone(), staff.clone());
        Ok(staff)
    }

    pub fn update_staff(&self, id: &str, req: StaffUpdate) -> PayrollResult<Staff> {
        let mut staff = self.staff.write();
        let member = staff
            .get_mut(id)
            .ok_or_else(|| PayrollError::NotFound(format!("staff {}", id)))?;

        if let Some(name) = req.name {
            if name.trim().is_empty() {
                return Err(PayrollError::Validation(
                    "name must not be empty".to_string(),
                ));
            }
            member.name = name.trim().to_string();
        }
        if let Some(department) = req.department {
            member.department = department;
        }
        if let Some(role) = req.role {
            member.role = role;
        }
        if let Some(status) = req.status {
            member.status = status;
        }
        // Compensation fields replace as a unit; omitting both leaves it unchanged
        match (req.salary, req.hourly_rate) {
            (None, None) => {}
            (salary, hourly_rate) => {
                validate_compensation(salary, hourly_rate)?;
                member.salary = salary;
                member.hourly_rate = hourly_rate;
            }
        }
        Ok(member.clone())
    }

    pub fn get_staff(&self, id: &str) -> PayrollResult<Staff> {
        self.staff
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| PayrollError::NotFound(format!("staff {}", id)))
    }

    pub fn list_staff(&self, seller_id: Option<&str>) -> Vec<Staff> {
        let mut members: Vec<Staff> = self
            .staff
            .read()
            .values()
            .filter(|s| seller_id.is_none_or(|id| s.seller_id == id))
            .cloned()
            .collect();
        members.sort_by(|a, b| a.name.cmp(&b.name));
        members
    }

    // ========== Payroll runs ==========

    /// Compute payslips for the seller's active staff and commit the run
    ///
    /// Salaried staff ignore submitted hours: monthly pay is the salary,
    /// weekly pay is salary / 4, and a salary wins over an hourly rate
    /// when both are set. Hourly staff are paid rate * hours, with
    /// unsubmitted hours treated as zero.
    pub fn process_run(
        &self,
        req: ProcessPayrollRequest,
        now: DateTime<Utc>,
    ) -> PayrollResult<PayrollRun> {
        if req.period_end <= req.period_start {
            return Err(PayrollError::Validation(
                "period must end after it starts".to_string(),
            ));
        }
        let mut hours_by_staff: HashMap<String, Decimal> = HashMap::new();
        for entry in &req.hours {
            if entry.hours < Decimal::ZERO {
                return Err(PayrollError::Validation(format!(
                    "hours for staff {} must be non-negative",
                    entry.staff_id
                )));
            }
            hours_by_staff.insert(entry.staff_id.clone(), entry.hours);
        }

        let members: Vec<Staff> = self
            .staff
            .read()
            .values()
            .filter(|s| s.seller_id == req.seller_id && s.status == StaffStatus::Active)
            .cloned()
            .collect();
        if members.is_empty() {
            return Err(PayrollError::Validation(format!(
                "seller {} has no active staff",
                req.seller_id
            )));
        }

        let mut payslips: Vec<Payslip> = Vec::with_capacity(members.len());
        let mut total = Decimal::ZERO;
        for member in members {
            let (hours_worked, net_pay) = match (member.salary, member.hourly_rate) {
                (Some(salary), _) => {
                    let pay = match req.period {
                        PayrollPeriod::Monthly => salary,
                        PayrollPeriod::Weekly => salary / Decimal::from(WEEKS_PER_MONTH),
                    };
                    (None, round_money(pay))
                }
                (None, Some(rate)) => {
                    let hours = hours_by_staff
                        .get(&member.id)
                        .copied()
                        .unwrap_or(Decimal::ZERO);
                    (Some(hours), round_money(rate * hours))
                }
                (None, None) => (None, Decimal::ZERO),
            };
            total += net_pay;
            payslips.push(Payslip {
                staff_id: member.id,
                staff_name: member.name,
                hours_worked,
                net_pay,
            });
        }
        payslips.sort_by(|a, b| a.staff_name.cmp(&b.staff_name));

        let run = PayrollRun {
            id: Uuid::new_v4().to_string(),
            seller_id: req.seller_id,
            period: req.period,
            period_start: req.period_start,
            period_end: req.period_end,
            payslips,
            status: PayrollStatus::Processed,
            total_amount: total,
            processed_at: Some(now),
        };
        self.runs.write().insert(run.id.clone(), run.clone());
        info!(
            run = %run.id,
            seller = %run.seller_id,
            total = %run.total_amount,
            "payroll run processed"
        );
        Ok(run)
    }

    pub fn get_run(&self, id: &str) -> PayrollResult<PayrollRun> {
        self.runs
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| PayrollError::NotFound(format!("payroll run {}", id)))
    }

    pub fn list_runs(&self, seller_id: Option<&str>) -> Vec<PayrollRun> {
        let mut runs: Vec<PayrollRun> = self
            .runs
            .read()
            .values()
            .filter(|r| seller_id.is_none_or(|id| r.seller_id == id))
            .cloned()
            .collect();
        runs.sort_by(|a, b| b.processed_at.cmp(&a.processed_at));
        runs
    }
}

/// At least one compensation scheme per staff member; any value set must
/// be positive
fn validate_compensation(
    salary: Option<Decimal>,
    hourly_rate: Option<Decimal>,
) -> PayrollResult<()> {
    if salary.is_none() && hourly_rate.is_none() {
        return Err(PayrollError::Validation(
            "staff requires a salary or an hourly rate".to_string(),
        ));
    }
    if [salary, hourly_rate]
        .into_iter()
        .flatten()
        .any(|v| v <= Decimal::ZERO)
    {
        return Err(PayrollError::Validation(
            "compensation must be positive".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use shared::{Department, StaffHours, StaffRole};

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn salaried(service: &PayrollService, name: &str, salary: &str) -> Staff {
        service
            .create_staff(StaffCreate {
                seller_id: "seller-1".to_string(),
                name: name.to_string(),
                department: Department::Warehouse,
                role: StaffRole::Associate,
                salary: Some(dec(salary)),
                hourly_rate: None,
            })
            .unwrap()
    }

    fn hourly(service: &PayrollService, name: &str, rate: &str) -> Staff {
        service
            .create_staff(StaffCreate {
                seller_id: "seller-1".to_string(),
                name: name.to_string(),
                department: Department::Delivery,
                role: StaffRole::Associate,
                salary: None,
                hourly_rate: Some(dec(rate)),
            })
            .unwrap()
    }

    fn run_request(period: PayrollPeriod, hours: Vec<StaffHours>) -> ProcessPayrollRequest {
        ProcessPayrollRequest {
            seller_id: "seller-1".to_string(),
            period,
            period_start: NaiveDate::from_ymd_opt(2026, 8, 1).unwrap(),
            period_end: NaiveDate::from_ymd_opt(2026, 8, 31).unwrap(),
            hours,
        }
    }

    #[test]
    fn compensation_requires_at_least_one_scheme() {
        let service = PayrollService::new();
        let neither = StaffCreate {
            seller_id: "seller-1".to_string(),
            name: "Alex Kim".to_string(),
            department: Department::Support,
            role: StaffRole::Manager,
            salary: None,
            hourly_rate: None,
        };
        assert!(service.create_staff(neither).is_err());

        let zero_rate = StaffCreate {
            seller_id: "seller-1".to_string(),
            name: "Alex Kim".to_string(),
            department: Department::Support,
            role: StaffRole::Manager,
            salary: None,
            hourly_rate: Some(Decimal::ZERO),
        };
        assert!(service.create_staff(zero_rate).is_err());

        // Both schemes together are allowed
        let both = StaffCreate {
            seller_id: "seller-1".to_string(),
            name: "Alex Kim".to_string(),
            department: Department::Support,
            role: StaffRole::Manager,
            salary: Some(dec("4000")),
            hourly_rate: Some(dec("25")),
        };
        let member = service.create_staff(both).unwrap();
        assert_eq!(member.salary, Some(dec("4000")));
        assert_eq!(member.hourly_rate, Some(dec("25")));
    }

    #[test]
    fn salary_wins_when_both_schemes_set() {
        let service = PayrollService::new();
        let member = service
            .create_staff(StaffCreate {
                seller_id: "seller-1".to_string(),
                name: "Alex Kim".to_string(),
                department: Department::Support,
                role: StaffRole::Manager,
                salary: Some(dec("4000")),
                hourly_rate: Some(dec("25")),
            })
            .unwrap();

        let run = service
            .process_run(
                run_request(
                    PayrollPeriod::Monthly,
                    vec![StaffHours {
                        staff_id: member.id,
                        hours: dec("160"),
                    }],
                ),
                Utc::now(),
            )
            .unwrap();
        assert_eq!(run.payslips[0].net_pay, dec("4000.00"));
        assert_eq!(run.payslips[0].hours_worked, None);
    }

    #[test]
    fn monthly_run_pays_salary_and_hours() {
        let service = PayrollService::new();
        salaried(&service, "Alex Kim", "4000");
        let h = hourly(&service, "Bo Chen", "25.50");

        let run = service
            .process_run(
                run_request(
                    PayrollPeriod::Monthly,
                    vec![StaffHours {
                        staff_id: h.id,
                        hours: dec("160"),
                    }],
                ),
                Utc::now(),
            )
            .unwrap();

        assert_eq!(run.status, PayrollStatus::Processed);
        assert_eq!(run.payslips.len(), 2);
        let alex = &run.payslips[0];
        assert_eq!(alex.net_pay, dec("4000.00"));
        assert_eq!(alex.hours_worked, None);
        let bo = &run.payslips[1];
        assert_eq!(bo.net_pay, dec("4080.00"));
        assert_eq!(bo.hours_worked, Some(dec("160")));
        assert_eq!(run.total_amount, dec("8080.00"));
    }

    #[test]
    fn weekly_run_quarters_the_salary() {
        let service = PayrollService::new();
        salaried(&service, "Alex Kim", "4000");
        let run = service
            .process_run(run_request(PayrollPeriod::Weekly, vec![]), Utc::now())
            .unwrap();
        assert_eq!(run.payslips[0].net_pay, dec("1000.00"));
    }

    #[test]
    fn salaried_staff_ignore_submitted_hours() {
        let service = PayrollService::new();
        let s = salaried(&service, "Alex Kim", "4000");
        let run = service
            .process_run(
                run_request(
                    PayrollPeriod::Monthly,
                    vec![StaffHours {
                        staff_id: s.id,
                        hours: dec("999"),
                    }],
                ),
                Utc::now(),
            )
            .unwrap();
        assert_eq!(run.payslips[0].net_pay, dec("4000.00"));
    }

    #[test]
    fn hourly_staff_without_hours_earn_zero() {
        let service = PayrollService::new();
        hourly(&service, "Bo Chen", "25");
        let run = service
            .process_run(run_request(PayrollPeriod::Monthly, vec![]), Utc::now())
            .unwrap();
        assert_eq!(run.payslips[0].net_pay, Decimal::ZERO);
        assert_eq!(run.payslips[0].hours_worked, Some(Decimal::ZERO));
    }

    #[test]
    fn inactive_staff_excluded() {
        let service = PayrollService::new();
        salaried(&service, "Alex Kim", "4000");
        let terminated = salaried(&service, "Bo Chen", "3000");
        service
            .update_staff(
                &terminated.id,
                StaffUpdate {
                    status: Some(StaffStatus::Terminated),
                    ..Default::default()
                },
            )
            .unwrap();

        let run = service
            .process_run(run_request(PayrollPeriod::Monthly, vec![]), Utc::now())
            .unwrap();
        assert_eq!(run.payslips.len(), 1);
        assert_eq!(run.payslips[0].staff_name, "Alex Kim");
    }

    #[test]
    fn negative_hours_rejected() {
        let service = PayrollService::new();
        let h = hourly(&service, "Bo Chen", "25");
        let result = service.process_run(
            run_request(
                PayrollPeriod::Monthly,
                vec![StaffHours {
                    staff_id: h.id,
                    hours: dec("-1"),
                }],
            ),
            Utc::now(),
        );
        assert!(matches!(result, Err(PayrollError::Validation(_))));
    }
}
