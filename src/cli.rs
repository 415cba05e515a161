// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, value_parser};

fn opt(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name).long(name).help(help)
}

fn req(name: &'static str, help: &'static str) -> Arg {
    opt(name, help).required(true)
}

fn json_args() -> [Arg; 2] {
    [
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print JSON"),
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .help("Print one JSON object per line"),
    ]
}

fn range_args() -> [Arg; 2] {
    [
        req("from", "First date, inclusive (YYYY-MM-DD)"),
        req("to", "Last date, inclusive (YYYY-MM-DD)"),
    ]
}

pub fn build_cli() -> Command {
    Command::new("runway")
        .about("Balance-consistent personal finance ledger with cash-flow forecasting")
        .version(clap::crate_version!())
        .arg(
            Arg::new("user")
                .long("user")
                .global(true)
                .value_parser(value_parser!(i64))
                .help("Acting user id (defaults to the default_user setting, else 1)"),
        )
        .subcommand(Command::new("init").about("Create the database"))
        .subcommand(
            Command::new("config")
                .about("Read or change settings")
                .subcommand(Command::new("get").arg(req("key", "Setting name")))
                .subcommand(
                    Command::new("set")
                        .arg(req("key", "Setting name"))
                        .arg(req("value", "Setting value")),
                )
                .subcommand(Command::new("list")),
        )
        .subcommand(
            Command::new("account")
                .about("Manage accounts")
                .subcommand(
                    Command::new("add")
                        .arg(req("name", "Account name"))
                        .arg(
                            opt("classification", "spending | non_spending")
                                .default_value("spending"),
                        )
                        .arg(
                            opt(
                                "type",
                                "cheque | savings | credit_card | investment | loan | other",
                            )
                            .default_value("cheque"),
                        )
                        .arg(opt("opening", "Opening balance").default_value("0"))
                        .arg(opt("credit-limit", "Credit limit")),
                )
                .subcommand(Command::new("list").args(json_args()))
                .subcommand(Command::new("show").arg(req("id", "Account id")))
                .subcommand(Command::new("rm").arg(req("id", "Account id"))),
        )
        .subcommand(
            Command::new("category")
                .about("Manage categories")
                .subcommand(Command::new("add").arg(req("name", "Category name")))
                .subcommand(Command::new("list"))
                .subcommand(
                    Command::new("recategorize")
                        .about("Assign a category to transactions and mark them reviewed")
                        .arg(req("ids", "Comma-separated transaction ids"))
                        .arg(req("category", "Category id")),
                ),
        )
        .subcommand(
            Command::new("tx")
                .about("Record and amend transactions")
                .subcommand(
                    Command::new("add")
                        .arg(req("account", "Account id"))
                        .arg(req("amount", "Positive amount"))
                        .arg(opt("type", "debit | credit").default_value("debit"))
                        .arg(opt("date", "YYYY-MM-DD (default today)"))
                        .arg(opt("description", "Description"))
                        .arg(opt("category", "Category id")),
                )
                .subcommand(
                    Command::new("transfer")
                        .arg(req("from", "Source account id"))
                        .arg(req("to", "Destination account id"))
                        .arg(req("amount", "Positive amount"))
                        .arg(opt("date", "YYYY-MM-DD (default today)"))
                        .arg(opt("description", "Description")),
                )
                .subcommand(
                    Command::new("edit")
                        .arg(req("id", "Transaction id"))
                        .arg(opt("amount", "New amount"))
                        .arg(opt("type", "debit | credit"))
                        .arg(opt("date", "YYYY-MM-DD"))
                        .arg(opt("description", "Description"))
                        .arg(opt("category", "Category id"))
                        .arg(opt("account", "Account id")),
                )
                .subcommand(Command::new("rm").arg(req("id", "Transaction id")))
                .subcommand(
                    Command::new("list")
                        .arg(opt("account", "Account id"))
                        .arg(opt("month", "YYYY-MM"))
                        .arg(opt("limit", "Maximum rows").value_parser(value_parser!(usize)))
                        .args(json_args()),
                ),
        )
        .subcommand(
            Command::new("recurring")
                .about("Recurring transaction templates")
                .subcommand(
                    Command::new("add")
                        .arg(req("name", "Template name"))
                        .arg(req("account", "Account id"))
                        .arg(opt("type", "debit | credit").default_value("debit"))
                        .arg(req("frequency", "weekly | monthly | yearly"))
                        .arg(opt("amount", "Fixed amount"))
                        .arg(opt("amount-max", "Ceiling for a variable amount"))
                        .arg(
                            Arg::new("variable")
                                .long("variable")
                                .action(ArgAction::SetTrue)
                                .help("Amount varies per occurrence"),
                        )
                        .arg(opt("day-of-month", "1-31 for monthly templates"))
                        .arg(opt("day-of-week", "0 (Sunday) - 6 for weekly templates"))
                        .arg(opt("start", "First pending occurrence (YYYY-MM-DD)"))
                        .arg(opt("category", "Category id")),
                )
                .subcommand(Command::new("list").args(json_args()))
                .subcommand(
                    Command::new("generate")
                        .about("Book the pending occurrence")
                        .arg(req("id", "Template id"))
                        .arg(opt("amount", "Actual amount for a variable template")),
                )
                .subcommand(
                    Command::new("skip")
                        .about("Skip the pending occurrence")
                        .arg(req("id", "Template id")),
                )
                .subcommand(Command::new("pause").arg(req("id", "Template id")))
                .subcommand(Command::new("resume").arg(req("id", "Template id"))),
        )
        .subcommand(
            Command::new("debt")
                .about("Debts and payments")
                .subcommand(
                    Command::new("add")
                        .arg(req("name", "Debt name"))
                        .arg(req("amount", "Original amount"))
                        .arg(opt("balance", "Current balance (default original amount)"))
                        .arg(opt("minimum", "Minimum payment").default_value("0"))
                        .arg(opt("fixed", "Fixed payment"))
                        .arg(opt("rate", "Interest rate, percent")),
                )
                .subcommand(Command::new("list").args(json_args()))
                .subcommand(
                    Command::new("pay")
                        .arg(req("debt", "Debt id"))
                        .arg(req("amount", "Payment amount"))
                        .arg(opt("date", "YYYY-MM-DD (default today)"))
                        .arg(opt("principal", "Principal part"))
                        .arg(opt("interest", "Interest part"))
                        .arg(opt("note", "Note")),
                )
                .subcommand(
                    Command::new("edit-payment")
                        .arg(req("id", "Payment id"))
                        .arg(opt("amount", "Payment amount"))
                        .arg(opt("date", "YYYY-MM-DD"))
                        .arg(opt("principal", "Principal part"))
                        .arg(opt("interest", "Interest part"))
                        .arg(opt("note", "Note")),
                )
                .subcommand(Command::new("rm-payment").arg(req("id", "Payment id")))
                .subcommand(
                    Command::new("payments")
                        .arg(req("debt", "Debt id"))
                        .args(json_args()),
                )
                .subcommand(Command::new("close").arg(req("id", "Debt id")))
                .subcommand(Command::new("reopen").arg(req("id", "Debt id"))),
        )
        .subcommand(
            Command::new("goal")
                .about("Savings goals and contributions")
                .subcommand(
                    Command::new("add")
                        .arg(req("name", "Goal name"))
                        .arg(opt("target", "Target amount"))
                        .arg(opt("current", "Amount already saved").default_value("0"))
                        .arg(opt("target-date", "YYYY-MM-DD")),
                )
                .subcommand(Command::new("list").args(json_args()))
                .subcommand(
                    Command::new("contribute")
                        .arg(req("goal", "Goal id"))
                        .arg(req("amount", "Contribution amount"))
                        .arg(opt("date", "YYYY-MM-DD (default today)"))
                        .arg(opt("note", "Note")),
                )
                .subcommand(
                    Command::new("edit-contribution")
                        .arg(req("id", "Contribution id"))
                        .arg(opt("amount", "Contribution amount"))
                        .arg(opt("date", "YYYY-MM-DD"))
                        .arg(opt("note", "Note")),
                )
                .subcommand(Command::new("rm-contribution").arg(req("id", "Contribution id")))
                .subcommand(
                    Command::new("contributions")
                        .arg(req("goal", "Goal id"))
                        .args(json_args()),
                ),
        )
        .subcommand(
            Command::new("budget")
                .about("Monthly budgets")
                .subcommand(Command::new("create").arg(req("month", "YYYY-MM")))
                .subcommand(Command::new("activate").arg(req("id", "Budget id")))
                .subcommand(Command::new("close").arg(req("id", "Budget id")))
                .subcommand(
                    Command::new("item")
                        .about("Add a planned expense line")
                        .arg(req("budget", "Budget id"))
                        .arg(req("name", "Line name"))
                        .arg(req("amount", "Amount"))
                        .arg(opt("category", "Category id")),
                )
                .subcommand(
                    Command::new("income")
                        .about("Add an income line")
                        .arg(req("budget", "Budget id"))
                        .arg(req("name", "Line name"))
                        .arg(req("amount", "Amount")),
                )
                .subcommand(
                    Command::new("one-off")
                        .about("Add a planned one-off expense")
                        .arg(req("budget", "Budget id"))
                        .arg(req("name", "Line name"))
                        .arg(req("amount", "Amount"))
                        .arg(opt("date", "YYYY-MM-DD")),
                )
                .subcommand(Command::new("rm-line").arg(req("id", "Line id")))
                .subcommand(
                    Command::new("show")
                        .arg(req("id", "Budget id"))
                        .args(json_args()),
                )
                .subcommand(Command::new("list").args(json_args())),
        )
        .subcommand(
            Command::new("tracker")
                .about("Day-by-day balance forecast")
                .subcommand(Command::new("generate").args(range_args()))
                .subcommand(Command::new("show").args(range_args()).args(json_args()))
                .subcommand(
                    Command::new("day")
                        .arg(req("date", "YYYY-MM-DD"))
                        .args(json_args()),
                )
                .subcommand(Command::new("clear").args(range_args()))
                .subcommand(
                    Command::new("export")
                        .args(range_args())
                        .arg(req("path", "CSV output file")),
                ),
        )
        .subcommand(
            Command::new("doctor")
                .about("Check stored balances against their records")
                .args(json_args()),
        )
}
