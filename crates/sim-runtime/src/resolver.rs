//! The quarterly resolver: an ordered pipeline turning one company's
//! decisions plus the shared economic state into an updated ledger and a
//! result report.
//!
//! Stages run in a fixed order because each reads state the previous one
//! mutated. Business-rule violations are clamped silently at the point of
//! use; nothing in here returns an error.

use rand::Rng;
use sim_core::report::{
    BalanceSheet, CashFlow, CostOfSales, DevOutcome, DevelopmentDetail, HeadcountMovement,
    IncomeStatement, OverheadBreakdown, PersonnelDetail, ProductionDetail, ResultReport,
    TransportDetail,
};
use sim_core::rules::{self, CostCategory, DeliveryMode, Role, Shift};
use sim_core::{
    Area, CellMap, CompanyLedger, DecisionRecord, Economy, Improvement, ImprovementKind, Machine,
    MachineOrder, MaterialOrder, Product, ProductMap, Vehicle,
};
use tracing::debug;

/// Balances captured before any stage runs, for average-balance interest
/// and the cash-flow statement.
struct Opening {
    cash: f64,
    overdraft: f64,
    loan: f64,
    debtors: f64,
    salespeople: u32,
    assembly_workers: u32,
    machinists: u32,
}

/// Deferred cost charges routed through the two creditor buckets
/// according to the payment-timing table.
#[derive(Default)]
struct Deferred {
    next: f64,
    later: f64,
}

impl Deferred {
    fn add(&mut self, category: CostCategory, amount: f64) {
        let timing = rules::payment_timing(category);
        self.next += amount * timing.next_quarter;
        self.later += amount * timing.quarter_after_next;
    }
}

/// Resolve one quarter for one company. `demand` is this company's
/// already-shared demand per cell, computed by the orchestrator from
/// immutable snapshots of every competitor.
pub(crate) fn resolve_quarter<R: Rng>(
    company: &mut CompanyLedger,
    decisions: &DecisionRecord,
    economy: &Economy,
    demand: &CellMap<f64>,
    rng: &mut R,
) -> ResultReport {
    let now = economy.now;
    let shift = Shift::from_level(decisions.shift_level);

    let opening = Opening {
        cash: company.finances.cash,
        overdraft: company.finances.overdraft,
        loan: company.finances.unsecured_loan,
        debtors: company.finances.debtors,
        salespeople: company.workforce.salespeople,
        assembly_workers: company.workforce.assembly_workers,
        machinists: company.machinists(shift),
    };

    let mut deferred = Deferred::default();
    let mut capital_receipts = 0.0;
    let mut capital_payments = 0.0;

    // 1. Personnel settlement: last quarter's dismissals leave, the
    // two-quarter recruitment/training queue shifts forward one leg.
    settle_personnel(company);

    // 2. Asset installment and fleet trades.
    let machines_installed = install_machines(company, economy);
    trade_assets(company, decisions, &mut capital_receipts, &mut capital_payments);

    // 3. Material deliveries maturing this quarter, at locked-in prices.
    let (material_delivered, material_cost) = deliver_materials(company, economy);

    // 4. Product development resolution.
    let dev_outcomes = resolve_development(company, decisions, economy, rng);

    // 5. Implementation of pending MAJOR improvements.
    let (write_off_units, write_off_value) = implement_majors(company, decisions);

    // 6. New order intake.
    let material_order_placed = intake_material_order(company, decisions, economy);
    let machines_ordered = intake_machine_order(company, decisions, economy, &mut deferred);

    // 7. Personnel decisions: pay rates, recruitment, training, dismissal.
    company.sales_salary = decisions.sales_salary.max(rules::MIN_SALES_SALARY);
    company.sales_commission_rate = decisions.sales_commission_pct;
    company.assembly_wage_rate = decisions.assembly_wage_rate.max(rules::ASSEMBLY_MIN_WAGE_RATE);

    let sales_recruited = sim_econ::recruitment_outcome(
        decisions.recruit_sales,
        sim_econ::sales_recruitment_rate(economy.unemployment, company.sales_salary),
        rng,
    );
    let assembly_recruited = sim_econ::recruitment_outcome(
        decisions.recruit_assembly,
        sim_econ::assembly_recruitment_rate(economy.unemployment, company.assembly_wage_rate),
        rng,
    );
    let sales_trained = decisions.train_sales.min(rules::MAX_TRAINEES_PER_CATEGORY);
    let assembly_trained = decisions.train_assembly.min(rules::MAX_TRAINEES_PER_CATEGORY);
    let sales_dismissed = decisions.dismiss_sales.min(company.workforce.salespeople);
    let assembly_dismissed = decisions.dismiss_assembly.min(company.workforce.assembly_workers);
    {
        let wf = &mut company.workforce;
        wf.sales_arriving_later += sales_recruited + sales_trained;
        wf.assembly_arriving_later += assembly_recruited + assembly_trained;
        // Dismissed workers stay on payroll through this quarter.
        wf.sales_leaving = sales_dismissed;
        wf.assembly_leaving = assembly_dismissed;
    }

    // 8. Production: the binding capacity ratio scales every scheduled
    // line uniformly; declared assembly time buys a lower reject rate.
    let maintenance_factor = sim_econ::maintenance_factor(decisions.maintenance_hours_per_machine);
    let effectiveness = (company.machine_efficiency * maintenance_factor).min(1.0);
    let machine_hours_available =
        company.machines.len() as f64 * shift.machine_hours() * effectiveness;

    let (basic_hours, _, _) = shift.worker_hours_split();
    let strike_hours =
        company.strike_weeks as f64 * basic_hours / rules::STRIKE_HOURS_PER_WEEK_DIVISOR;
    let hours_per_worker = (shift.worker_hours() - strike_hours).max(0.0);
    let assembly_hours_available = company.workforce.assembly_workers as f64 * hours_per_worker;

    let planned_total = decisions.deliveries.total();
    let mut machine_hours_required = 0.0;
    let mut assembly_hours_required = 0.0;
    for (p, _, &qty) in decisions.deliveries.iter() {
        machine_hours_required += qty as f64 * rules::min_machining_minutes(p) / 60.0;
        assembly_hours_required += qty as f64 * declared_assembly_minutes(decisions, p) / 60.0;
    }
    let capacity_ratio = if planned_total == 0 {
        1.0
    } else {
        let machining = if machine_hours_required > 0.0 {
            machine_hours_available / machine_hours_required
        } else {
            1.0
        };
        let assembly = if assembly_hours_required > 0.0 {
            assembly_hours_available / assembly_hours_required
        } else {
            1.0
        };
        machining.min(assembly).min(1.0)
    };

    let mut produced: CellMap<u32> = CellMap::default();
    let mut rejected: CellMap<u32> = CellMap::default();
    for p in Product::ALL {
        let reject_rate = sim_econ::reject_rate(
            declared_assembly_minutes(decisions, p),
            rules::min_assembly_minutes(p),
        );
        for a in Area::ALL {
            let achieved = (decisions.deliveries[(p, a)] as f64 * capacity_ratio) as u32;
            let rejects = (achieved as f64 * reject_rate) as u32;
            produced[(p, a)] = achieved - rejects;
            rejected[(p, a)] = rejects;
        }
    }
    let machine_hours_worked = machine_hours_required * capacity_ratio;
    let assembly_hours_worked = assembly_hours_required * capacity_ratio;

    // 9. Material consumption, capped at what is actually on hand.
    let material_required: f64 = decisions
        .deliveries
        .iter()
        .map(|(p, _, &qty)| qty as f64 * rules::material_per_unit(p))
        .sum::<f64>()
        * capacity_ratio;
    let material_opening = company.material_stock;
    let material_available = material_opening + material_delivered;
    let material_consumed = material_required.min(material_available);
    company.material_stock = material_available - material_consumed;

    // 10. Demand and sales per cell; half of unmet demand carries into
    // next quarter's backlog, the other half is lost.
    let mut orders_received: CellMap<u32> = CellMap::default();
    let mut sold: CellMap<u32> = CellMap::default();
    let mut revenue = 0.0;
    for p in Product::ALL {
        for a in Area::ALL {
            let demand_units = demand[(p, a)].max(0.0) as u32;
            orders_received[(p, a)] = demand_units;

            let available_units = company.stocks[(p, a)] + produced[(p, a)];
            let potential = company.backlog[(p, a)] + demand_units;
            let units_sold = available_units.min(potential);
            sold[(p, a)] = units_sold;
            company.stocks[(p, a)] = available_units - units_sold;
            company.backlog[(p, a)] = ((potential - units_sold) as f64 * 0.5) as u32;
            revenue += units_sold as f64 * decisions.price_for(p, a);
        }
    }

    // 11. Cost aggregation.
    let assembly_wages = assembly_hours_worked * company.assembly_wage_rate;
    let machinist_wage_rate = company.assembly_wage_rate * (1.0 + shift.machinist_premium());
    let machinist_wages = machine_hours_worked * machinist_wage_rate;
    let production_overheads = rules::SUPERVISION_COST_PER_SHIFT * shift.level() as f64
        + rules::PRODUCTION_OVERHEAD_PER_MACHINE * company.machines.len() as f64
        + rules::MACHINE_RUNNING_COST_PER_HOUR * machine_hours_worked
        + rules::PRODUCTION_PLANNING_COST_PER_UNIT * planned_total as f64;
    let cost_of_sales = CostOfSales {
        materials: material_cost,
        assembly_wages,
        machinist_wages,
        production_overheads,
    };

    let advertising_cost: f64 = decisions
        .advertising
        .iter()
        .map(|(_, _, spend)| spend.total())
        .sum();
    let development_cost = decisions.development_spend.total();
    let commission = revenue * company.sales_commission_rate / 100.0;
    let sales_force = company.workforce.salespeople as f64
        * (company.sales_salary + rules::SALESPERSON_EXPENSES)
        + commission;
    let personnel_department = sales_recruited as f64 * Role::Salesperson.recruitment_cost()
        + assembly_recruited as f64 * Role::AssemblyWorker.recruitment_cost()
        + sales_dismissed as f64 * Role::Salesperson.dismissal_cost()
        + assembly_dismissed as f64 * Role::AssemblyWorker.dismissal_cost()
        + sales_trained as f64 * Role::Salesperson.training_cost()
        + assembly_trained as f64 * Role::AssemblyWorker.training_cost();
    let maintenance = company.machines.len() as f64
        * decisions.maintenance_hours_per_machine
        * rules::CONTRACTED_MAINTENANCE_RATE;
    let warehousing = rules::FIXED_QUARTERLY_WAREHOUSE_COST
        + rules::PRODUCT_STORAGE_COST * company.stocks.total() as f64;
    let external_storage = (company.material_stock - rules::FACTORY_STORAGE_CAPACITY).max(0.0)
        * rules::VARIABLE_EXTERNAL_STORAGE_COST;
    let purchasing = rules::FIXED_QUARTERLY_ADMIN_COST
        + if material_order_placed {
            rules::COST_PER_ORDER
        } else {
            0.0
        };
    let management = decisions.management_budget.max(rules::MIN_MANAGEMENT_BUDGET);
    let transport = transport_costs(company.vehicles.len(), &produced);
    let guarantee_servicing: f64 = rejected
        .iter()
        .map(|(p, _, &units)| units as f64 * rules::servicing_charge(p))
        .sum();
    let mut information = 0.0;
    if decisions.buy_competitor_info {
        information += rules::COMPETITOR_INFO_COST;
    }
    if decisions.buy_market_shares {
        information += rules::MARKET_SHARES_INFO_COST;
    }

    let overheads = OverheadBreakdown {
        advertising: advertising_cost,
        product_development: development_cost,
        sales_force,
        personnel_department,
        maintenance,
        warehousing,
        external_storage,
        purchasing,
        management,
        transport: transport.total(),
        guarantee_servicing,
        information,
        stock_write_off: write_off_value,
    };

    // Route deferred categories into the creditor buckets; everything
    // else pays at this quarter's settlement.
    deferred.add(CostCategory::Advertising, advertising_cost);
    deferred.add(CostCategory::ProductDevelopment, development_cost);
    deferred.add(CostCategory::PersonnelDepartment, personnel_department);
    deferred.add(CostCategory::Maintenance, maintenance);
    deferred.add(CostCategory::WarehousingPurchasing, warehousing + purchasing);
    deferred.add(CostCategory::ExternalStorage, external_storage);
    deferred.add(CostCategory::GuaranteeServicing, guarantee_servicing);
    deferred.add(CostCategory::BusinessIntelligence, information);
    deferred.add(CostCategory::HiredTransport, transport.hired_cost);
    deferred.add(CostCategory::MaterialsPurchased, material_cost);

    let gross_profit = revenue - cost_of_sales.total();
    let ebitda = gross_profit - overheads.total();

    // 12. Depreciation: machines on current book value, vehicles on
    // original cost compounded by age.
    let mut depreciation = 0.0;
    for machine in &mut company.machines {
        depreciation += machine.depreciate();
    }
    for vehicle in &mut company.vehicles {
        depreciation += vehicle.quarterly_depreciation();
        vehicle.age_quarters += 1;
    }

    // 13. Interest on average balances, then the annual tax assessment.
    let average_cash = (opening.cash + company.finances.cash) / 2.0;
    let average_overdraft = (opening.overdraft + company.finances.overdraft) / 2.0;
    let average_loan = (opening.loan + company.finances.unsecured_loan) / 2.0;
    let interest_received =
        average_cash.max(0.0) * sim_econ::deposit_rate(economy.cb_rate) / 4.0;
    let interest_paid = (average_overdraft * sim_econ::overdraft_rate(economy.cb_rate)
        + average_loan * sim_econ::loan_rate(economy.cb_rate))
        / 4.0;
    deferred.add(CostCategory::Interest, interest_paid);

    let profit_before_tax = ebitda + interest_received - interest_paid - depreciation;
    company.finances.taxable_profit_ytd += profit_before_tax;
    let tax = if now.is_year_end() {
        let assessment = (company.finances.taxable_profit_ytd * rules::TAX_RATE).max(0.0);
        let payment = (assessment - company.finances.tax_liability).max(0.0);
        company.finances.tax_liability = assessment;
        company.finances.taxable_profit_ytd = 0.0;
        payment
    } else {
        0.0
    };
    let net_profit = profit_before_tax - tax;

    // 14. Cash settlement: dividends are payable in the first and third
    // quarters only, clamped to what the company can cover; any shortfall
    // is drawn from overdraft headroom before spilling into unsecured
    // loans. Cash never ends negative.
    let dividends = if now.index == 1 || now.index == 3 {
        (decisions.dividend_per_share * company.shares_outstanding)
            .min((net_profit + company.finances.reserves + company.finances.cash).max(0.0))
    } else {
        0.0
    };

    let creditors_matured = company.finances.creditors_due_next;
    company.finances.creditors_due_next = company.finances.creditors_due_later + deferred.next;
    company.finances.creditors_due_later = deferred.later;

    let receipts_from_sales = revenue * rules::REVENUE_CASH_FRACTION;
    let debtors_collected = opening.debtors;
    company.finances.debtors = revenue * (1.0 - rules::REVENUE_CASH_FRACTION);

    let immediate_payments = assembly_wages
        + machinist_wages
        + production_overheads
        + sales_force
        + management
        + transport.fleet_fixed_cost
        + transport.own_running_cost;
    let receipts = receipts_from_sales + debtors_collected + interest_received + capital_receipts;
    let payments = immediate_payments + creditors_matured + capital_payments + tax + dividends;
    let net_cash_flow = receipts - payments;
    company.finances.cash += net_cash_flow;

    let mut overdraft_drawn = 0.0;
    let mut loan_drawn = 0.0;
    if company.finances.cash < 0.0 {
        let needed = -company.finances.cash;
        company.finances.cash = 0.0;
        let limit = company.overdraft_limit(economy.material_price);
        let headroom = (limit - company.finances.overdraft).max(0.0);
        overdraft_drawn = needed.min(headroom);
        company.finances.overdraft += overdraft_drawn;
        loan_drawn = needed - overdraft_drawn;
        company.finances.unsecured_loan += loan_drawn;
        debug!(
            company = %company.name,
            overdraft_drawn, loan_drawn, "settlement shortfall covered by borrowing"
        );
    }

    let retained = net_profit - dividends;
    company.finances.reserves += retained;

    // 15. Equity update: damped blend of prior price, net worth per
    // share, earnings and dividend, floored above zero.
    let net_worth = company.net_worth(economy.material_price);
    let eps = net_profit / company.shares_outstanding;
    let dps = dividends / company.shares_outstanding;
    company.share_price = (0.5 * company.share_price
        + 0.3 * (net_worth / company.shares_outstanding)
        + 5.0 * eps
        + 3.0 * dps)
        .max(0.1);

    // Carry forward the quarter's operating posture.
    company.machine_efficiency = (company.machine_efficiency * maintenance_factor).min(1.0);
    company.shift = shift;

    let report = ResultReport {
        company: company.name.clone(),
        period: now,
        income: IncomeStatement {
            revenue,
            cost_of_sales: cost_of_sales.total(),
            gross_profit,
            total_overheads: overheads.total(),
            ebitda,
            interest_received,
            interest_paid,
            depreciation,
            profit_before_tax,
            tax,
            net_profit,
            dividends,
            retained,
        },
        cost_of_sales,
        overheads,
        transport,
        production: ProductionDetail {
            scheduled: decisions.deliveries,
            produced,
            rejected,
            orders_received,
            sold,
            closing_backlog: company.backlog,
            closing_stock: company.stocks,
            capacity_ratio,
            machine_hours_available,
            machine_hours_worked,
            assembly_hours_available,
            assembly_hours_worked,
            material_opening,
            material_delivered,
            material_consumed,
            material_closing: company.material_stock,
        },
        personnel: PersonnelDetail {
            sales: HeadcountMovement {
                opening: opening.salespeople,
                recruited: sales_recruited,
                trained: sales_trained,
                dismissed: sales_dismissed,
                closing: company.workforce.salespeople,
            },
            assembly: HeadcountMovement {
                opening: opening.assembly_workers,
                recruited: assembly_recruited,
                trained: assembly_trained,
                dismissed: assembly_dismissed,
                closing: company.workforce.assembly_workers,
            },
            machinists_opening: opening.machinists,
            machinists_closing: company.machinists(shift),
        },
        development: DevelopmentDetail {
            outcomes: dev_outcomes,
            star_ratings: company.star_ratings,
            write_off_units,
        },
        balance_sheet: BalanceSheet {
            property: company.property_value,
            machines: company.machine_value(),
            vehicles: company.vehicle_value(),
            product_stocks: company.product_stock_value(),
            material_stock: company.material_stock_value(economy.material_price),
            debtors: company.finances.debtors,
            cash: company.finances.cash,
            overdraft: company.finances.overdraft,
            unsecured_loans: company.finances.unsecured_loan,
            tax_liability: company.finances.tax_liability,
            creditors: company.finances.creditors(),
            ordinary_capital: company.shares_outstanding * rules::SHARE_ISSUE_VALUE,
            reserves: company.finances.reserves,
            net_worth,
        },
        cash_flow: CashFlow {
            receipts_from_sales,
            debtors_collected,
            immediate_payments,
            creditors_paid: creditors_matured,
            capital_receipts,
            capital_payments,
            interest_received,
            tax_paid: tax,
            dividends_paid: dividends,
            net_cash_flow,
            opening_cash: opening.cash,
            closing_cash: company.finances.cash,
            overdraft_drawn,
            loan_drawn,
        },
        share_price: company.share_price,
        shift_level: shift.level(),
        machines_installed,
        machines_ordered,
        strike_weeks_next: company.strike_weeks,
    };

    company.last_report = Some(report.clone());
    report
}

/// Declared assembly minutes, clamped up to the technical minimum.
fn declared_assembly_minutes(decisions: &DecisionRecord, p: Product) -> f64 {
    decisions.assembly_minutes[p].max(rules::min_assembly_minutes(p))
}

/// Stage 1: apply queued dismissals, then shift the two-quarter arrival
/// queue one leg forward.
fn settle_personnel(company: &mut CompanyLedger) {
    let wf = &mut company.workforce;
    wf.salespeople = wf.salespeople.saturating_sub(wf.sales_leaving);
    wf.assembly_workers = wf.assembly_workers.saturating_sub(wf.assembly_leaving);
    wf.sales_leaving = 0;
    wf.assembly_leaving = 0;

    wf.salespeople += wf.sales_arriving_next;
    wf.assembly_workers += wf.assembly_arriving_next;
    wf.sales_arriving_next = wf.sales_arriving_later;
    wf.assembly_arriving_next = wf.assembly_arriving_later;
    wf.sales_arriving_later = 0;
    wf.assembly_arriving_later = 0;
}

/// Stage 2a: install machine orders whose installation quarter is now.
/// Idempotent per order: an order installs at most once.
fn install_machines(company: &mut CompanyLedger, economy: &Economy) -> u32 {
    let mut installed = 0;
    let mut new_machines = 0;
    for order in company.machine_orders.iter_mut() {
        if !order.installed && order.installation_due == economy.now {
            order.installed = true;
            installed += order.quantity;
            new_machines += order.quantity;
        }
    }
    for _ in 0..new_machines {
        company.machines.push(Machine::new());
    }
    installed
}

/// Stage 2b: fleet trades and machine disposals. Sales remove the oldest
/// units (front of the list) at depreciated value; disposed machines
/// supply no hours this quarter.
fn trade_assets(
    company: &mut CompanyLedger,
    decisions: &DecisionRecord,
    capital_receipts: &mut f64,
    capital_payments: &mut f64,
) {
    let machines_sold = decisions.machines_to_sell.min(company.machines.len() as u32);
    for _ in 0..machines_sold {
        let machine = company.machines.remove(0);
        *capital_receipts += machine.book_value;
    }
    let vehicles_sold = decisions.vehicles_to_sell.min(company.vehicles.len() as u32);
    for _ in 0..vehicles_sold {
        let vehicle = company.vehicles.remove(0);
        *capital_receipts += vehicle.value();
    }
    for _ in 0..decisions.vehicles_to_buy {
        company.vehicles.push(Vehicle::default());
        *capital_payments += rules::VEHICLE_COST;
    }
}

/// Stage 3: deliver matured material orders. Immediate and weekly
/// suppliers deliver the full quantity in one lump; multiple-delivery
/// orders deliver one even split per the declared delivery count.
fn deliver_materials(company: &mut CompanyLedger, economy: &Economy) -> (f64, f64) {
    let mut delivered = 0.0;
    let mut cost = 0.0;
    for order in company.material_orders.iter_mut() {
        if order.delivered || order.due != economy.now {
            continue;
        }
        let terms = rules::supplier_terms(order.supplier);
        let quantity = match terms.mode {
            DeliveryMode::Immediate | DeliveryMode::Weekly => order.quantity,
            DeliveryMode::Multiple => order.quantity / order.deliveries.max(1) as f64,
        };
        cost += quantity * (order.price_per_1000 / 1_000.0) * (1.0 - terms.discount)
            + terms.delivery_charge;
        delivered += quantity;
        order.delivered = true;
    }
    // Stock itself is updated by the consumption stage, which needs the
    // opening level and the delivery separately.
    (delivered, cost)
}

/// Stage 4: accumulate development spend and roll for outcomes. A MAJOR
/// success is suppressed while another MAJOR awaits implementation; a
/// product with an abandoned project risks star decay.
fn resolve_development<R: Rng>(
    company: &mut CompanyLedger,
    decisions: &DecisionRecord,
    economy: &Economy,
    rng: &mut R,
) -> ProductMap<DevOutcome> {
    let mut outcomes = ProductMap::splat(DevOutcome::None);
    for p in Product::ALL {
        let spend = decisions.development_spend[p];
        if spend > 0.0 {
            company.dev_accumulated[p] += spend;
            company.dev_active[p] = true;
        }
        let accumulated = company.dev_accumulated[p];
        if accumulated > 0.0 {
            if accumulated > rules::DEV_MAJOR_THRESHOLD
                && rng.gen::<f64>() < rules::DEV_MAJOR_PROBABILITY
            {
                if !company.has_pending_major(p) {
                    company.improvements.push(Improvement {
                        product: p,
                        kind: ImprovementKind::Major,
                        reported: economy.now,
                        implemented: false,
                    });
                    company.dev_accumulated[p] = 0.0;
                    outcomes[p] = DevOutcome::Major;
                    debug!(company = %company.name, product = p.name(), "major improvement reported");
                }
            } else if accumulated > rules::DEV_MINOR_THRESHOLD
                && rng.gen::<f64>() < rules::DEV_MINOR_PROBABILITY
            {
                company.star_ratings[p] =
                    (company.star_ratings[p] + rules::STAR_MINOR_STEP).min(rules::STAR_MAX);
                outcomes[p] = DevOutcome::Minor;
            }
        }
        if company.dev_accumulated[p] == 0.0
            && company.dev_active[p]
            && rng.gen::<f64>() < rules::DEV_DECAY_PROBABILITY
        {
            company.star_ratings[p] =
                (company.star_ratings[p] - rules::STAR_MINOR_STEP).max(rules::STAR_MIN);
        }
    }
    outcomes
}

/// Stage 5: implement flagged MAJOR improvements, clearing all area stock
/// for the product. Returns written-off units and their book value.
fn implement_majors(
    company: &mut CompanyLedger,
    decisions: &DecisionRecord,
) -> (ProductMap<u32>, f64) {
    let mut write_off_units = ProductMap::splat(0u32);
    let mut write_off_value = 0.0;
    for p in Product::ALL {
        if !decisions.implement_major[p] {
            continue;
        }
        let mut implemented_any = false;
        for imp in company.improvements.iter_mut() {
            if imp.product == p && imp.kind == ImprovementKind::Major && !imp.implemented {
                imp.implemented = true;
                implemented_any = true;
            }
        }
        if implemented_any {
            company.star_ratings[p] =
                (company.star_ratings[p] + rules::STAR_MAJOR_STEP).min(rules::STAR_MAX);
            let cleared = company.stocks.product_total(p) as u32;
            write_off_units[p] = cleared;
            write_off_value += cleared as f64 * rules::stock_valuation(p);
            for a in Area::ALL {
                company.stocks[(p, a)] = 0;
            }
        }
    }
    (write_off_units, write_off_value)
}

/// Stage 6a: record a new material order for delivery two quarters out at
/// the price in effect now. Below-minimum orders are dropped outright.
fn intake_material_order(
    company: &mut CompanyLedger,
    decisions: &DecisionRecord,
    economy: &Economy,
) -> bool {
    if decisions.material_quantity <= 0.0 {
        return false;
    }
    let terms = rules::supplier_terms(decisions.material_supplier);
    if decisions.material_quantity < terms.min_order {
        debug!(
            company = %company.name,
            quantity = decisions.material_quantity,
            minimum = terms.min_order,
            "material order below supplier minimum, dropped"
        );
        return false;
    }
    let deliveries = match terms.mode {
        DeliveryMode::Immediate => 1,
        DeliveryMode::Weekly => rules::WEEKLY_DELIVERIES_PER_QUARTER,
        DeliveryMode::Multiple => decisions.material_deliveries.max(1),
    };
    company.material_orders.push(MaterialOrder {
        quantity: decisions.material_quantity,
        supplier: decisions.material_supplier,
        deliveries,
        placed: economy.now,
        due: economy.now.plus(2),
        price_per_1000: economy.material_price,
        delivered: false,
    });
    true
}

/// Stage 6b: record a machine order, clamped to what creditworthiness
/// covers in deposits. The request is reduced, never rejected outright,
/// and the full purchase price is routed through the 50/50 payment split.
fn intake_machine_order(
    company: &mut CompanyLedger,
    decisions: &DecisionRecord,
    economy: &Economy,
    deferred: &mut Deferred,
) -> u32 {
    if decisions.machines_to_order == 0 {
        return 0;
    }
    let creditworthiness = company.creditworthiness(economy.material_price);
    let affordable = (creditworthiness / rules::MACHINE_DEPOSIT) as u32;
    let quantity = decisions.machines_to_order.min(affordable);
    if quantity == 0 {
        return 0;
    }
    if quantity < decisions.machines_to_order {
        debug!(
            company = %company.name,
            requested = decisions.machines_to_order,
            granted = quantity,
            "machine order clamped by creditworthiness"
        );
    }
    company.machine_orders.push(MachineOrder {
        quantity,
        placed: economy.now,
        installation_due: economy.now.plus(2),
        available: economy.now.plus(3),
        installed: false,
    });
    deferred.add(
        CostCategory::MachinesPurchased,
        quantity as f64 * rules::MACHINE_COST,
    );
    quantity
}

/// Transport sub-routine: pack each area's good units into 40-equivalent
/// vehicle trips, cover the required vehicle-days from the owned fleet
/// first, and hire the shortfall.
fn transport_costs(vehicle_count: usize, shipped: &CellMap<u32>) -> TransportDetail {
    let mut days_required = 0u32;
    for a in Area::ALL {
        let mut load = 0.0;
        for p in Product::ALL {
            load += shipped[(p, a)] as f64 / rules::vehicle_capacity(p) as f64;
        }
        if load > 0.0 {
            days_required += load.ceil() as u32 * rules::journey_days(a);
        }
    }
    let own_capacity = vehicle_count as u32 * rules::MAX_VEHICLE_DAYS_PER_QUARTER;
    let own_days_used = days_required.min(own_capacity);
    let hired_days = days_required - own_days_used;
    TransportDetail {
        vehicle_days_required: days_required,
        own_days_used,
        hired_days,
        fleet_fixed_cost: vehicle_count as f64 * rules::FLEET_FIXED_COST_PER_VEHICLE,
        own_running_cost: own_days_used as f64 * rules::OWN_VEHICLE_RUNNING_COST_PER_DAY,
        hired_cost: hired_days as f64 * rules::HIRED_VEHICLE_COST_PER_DAY,
    }
}
