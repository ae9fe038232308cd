use super::*;
use fk_index::{Index, IndexRecord, RecordKind, VariableDeclaration};
use fk_scope::{ResolveOptions, ScopeCache};
use pretty_assertions::assert_eq;
use std::rc::Rc;

fn strings(names: &[&str]) -> Vec<String> {
    names.iter().map(ToString::to_string).collect()
}

fn scope() -> Rc<Scope> {
    let index = Index::new(vec![IndexRecord::new(RecordKind::Module, "m")
        .with_subprograms(vec![IndexRecord::new(RecordKind::Subroutine, "step")
            .with_dummy_args(strings(&["x", "n", "alpha"]))
            .with_variables(vec![
                VariableDeclaration::scalar("i", "integer", ""),
                VariableDeclaration::scalar("j", "integer", ""),
                VariableDeclaration::scalar("n", "integer", ""),
                VariableDeclaration::scalar("s", "real", "8"),
                VariableDeclaration::scalar("t", "real", "8"),
                VariableDeclaration::scalar("alpha", "real", "8"),
                VariableDeclaration::scalar("two", "real", "8").with_parameter_value("2.0"),
                VariableDeclaration::array("x", "real", "8", &["1"], &["n"]),
            ])])]);
    ScopeCache::new()
        .resolve(&index, "m:step", &ResolveOptions::default())
        .unwrap()
}

/// `!$cuf kernel do` over `x(i)` summing into `s`.
fn sum_kernel() -> ParsedKernel {
    ParsedKernel {
        kernel_name: "step_12".to_string(),
        launcher_name: "launch_step_12".to_string(),
        parent_tag: "m:step".to_string(),
        line: 12,
        identifiers: strings(&["i", "x", "n", "s"]),
        loop_vars: strings(&["i"]),
        reductions: vec![ReductionClause {
            op: "sum".to_string(),
            variables: strings(&["s"]),
        }],
        dimensions: 1,
        problem_size: vec![DimEntry::from("n")],
        grid: vec![DimEntry::NOT_FOUND],
        block: vec![DimEntry::NOT_SPECIFIED],
        c_body: "s += x[i];".to_string(),
        f_body: "s = s + x(i)\n".to_string(),
        stream: "c_null_ptr".to_string(),
        shared_mem: "0".to_string(),
        ..ParsedKernel::default()
    }
}

fn arg_names(interface: &InterfaceDescriptor) -> Vec<&str> {
    interface.arg_names.iter().map(String::as_str).collect()
}

// === Reductions ===

#[test]
fn reduction_target_becomes_device_buffer() {
    let kernel = assemble_kernel(&scope(), &sum_kernel(), ErrorPolicy::lenient()).unwrap();
    let descriptor = &kernel.descriptor;

    assert_eq!(
        descriptor.reductions,
        vec![Reduction {
            buffer: "_d_s".to_string(),
            name: "s".to_string(),
            c_type: "double".to_string(),
            op: "sum".to_string(),
        }]
    );
    assert!(descriptor.kernel_call_arg_names.contains(&"_d_s".to_string()));
    assert!(!descriptor.kernel_call_arg_names.contains(&"s".to_string()));
    assert!(descriptor.kernel_args.contains(&"double* s".to_string()));
    assert!(kernel.has_reductions());
}

#[test]
fn reduction_rewrite_drops_value_qualifier() {
    let mut arguments = vec![KernelArgument {
        name: "s".to_string(),
        call_arg_name: "s".to_string(),
        f_type: "real(8)".to_string(),
        orig_type: "real(8)".to_string(),
        qualifiers: strings(&["VALUE", "intent(inout)"]),
        c_type: "double".to_string(),
        c_size: String::new(),
        value: None,
        bytes_per_element: "8".to_string(),
        reduction_op: None,
        role: crate::ArgumentRole::Value,
    }];
    let clauses = vec![
        ReductionClause {
            op: "max".to_string(),
            variables: strings(&["S"]),
        },
        ReductionClause {
            op: "sum".to_string(),
            variables: strings(&["s"]),
        },
    ];
    let reductions = rewrite_reductions(&mut arguments, &clauses);

    assert_eq!(reductions.len(), 1);
    assert_eq!(reductions[0].op, "max");
    let s = &arguments[0];
    assert_eq!(s.qualifiers, vec!["intent(inout)"]);
    assert_eq!(s.c_type, "double*");
    assert_eq!(s.call_arg_name, "_d_s");
    assert_eq!(s.reduction_op.as_deref(), Some("max"));
}

// === Launch dimensions ===

#[test]
fn sentinel_block_falls_back_to_default() {
    let kernel = assemble_kernel(&scope(), &sum_kernel(), ErrorPolicy::lenient()).unwrap();
    let descriptor = &kernel.descriptor;

    assert!(descriptor.grid.is_empty());
    assert_eq!(
        descriptor.block,
        vec![LabeledDim {
            dim: 'X',
            value: DimEntry::Literal(128)
        }]
    );
    assert_eq!(descriptor.grid_dims, vec!["step_12_gridX"]);
    assert_eq!(descriptor.block_dims, vec!["step_12_blockX"]);
    assert_eq!(
        descriptor.size,
        vec![LabeledDim {
            dim: 'X',
            value: DimEntry::from("n")
        }]
    );
}

#[test]
fn problem_size_keeps_sentinels() {
    let size = label_dims(&[DimEntry::NOT_SPECIFIED, DimEntry::from("m")], 2, false);
    assert_eq!(size[0].value, DimEntry::NOT_SPECIFIED);
    assert_eq!(size[1].dim, 'Y');

    let grid = label_dims(&[DimEntry::NOT_SPECIFIED, DimEntry::from("m")], 2, true);
    assert_eq!(grid.len(), 1);
    assert_eq!(grid[0].dim, 'X');
}

#[test]
fn labels_stop_at_dimensionality() {
    let block = label_dims(&default_block(2), 2, true);
    let labels: Vec<char> = block.iter().map(|d| d.dim).collect();
    assert_eq!(labels, vec!['X', 'Y']);
    assert_eq!(default_block(3).len(), 3);
    assert_eq!(default_block(1), vec![DimEntry::Literal(128)]);
}

#[test]
fn dim_entries_deserialize_from_numbers_and_text() {
    let entries: Vec<DimEntry> = serde_json::from_str(r#"[-2, -1, 256, "n/2"]"#).unwrap();
    assert_eq!(
        entries,
        vec![
            DimEntry::NOT_FOUND,
            DimEntry::NOT_SPECIFIED,
            DimEntry::Literal(256),
            DimEntry::from("n/2"),
        ]
    );
    assert!(entries[0].is_sentinel());
    assert!(!entries[2].is_sentinel());
    assert_eq!(entries[3].to_string(), "n/2");
}

// === Interfaces ===

#[test]
fn manual_and_auto_interfaces_share_argument_tail() {
    let kernel = assemble_kernel(&scope(), &sum_kernel(), ErrorPolicy::lenient()).unwrap();
    let [manual, auto] = kernel.interfaces.as_slice() else {
        panic!("expected two interfaces");
    };

    assert_eq!(manual.variant, InterfaceVariant::Manual);
    assert_eq!(manual.f_name, "launch_step_12");
    assert_eq!(manual.c_name.as_deref(), Some("launch_step_12"));
    assert_eq!(
        arg_names(manual),
        vec!["grid", "block", "sharedMem", "stream", "x", "x_lb1", "x_n1", "n", "s"]
    );

    assert_eq!(auto.variant, InterfaceVariant::Auto);
    assert_eq!(auto.f_name, "launch_step_12_auto");
    assert_eq!(
        arg_names(auto),
        vec!["sharedMem", "stream", "x", "x_lb1", "x_n1", "n", "s"]
    );
}

#[test]
fn host_call_site_names_follow_argument_order() {
    let kernel = assemble_kernel(&scope(), &sum_kernel(), ErrorPolicy::lenient()).unwrap();
    assert_eq!(
        kernel.host_call_arg_names,
        vec!["c_loc(x)", "lbound(x,1)", "size(x,1)", "n", "_d_s"]
    );
    assert_eq!(kernel.stream, "c_null_ptr");
    assert_eq!(kernel.shared_mem, "0");
    assert!(kernel.default_present.is_empty());
}

#[test]
fn open_acc_reports_default_present_arrays() {
    let parsed = ParsedKernel {
        abi: AbiVariant::OpenAcc,
        ..sum_kernel()
    };
    let kernel = assemble_kernel(&scope(), &parsed, ErrorPolicy::lenient()).unwrap();
    assert_eq!(kernel.default_present, vec!["x"]);
    assert_eq!(kernel.host_call_arg_names[0], "d_x");
}

#[test]
fn cpu_routine_wraps_body_with_copies() {
    let kernel = assemble_kernel(&scope(), &sum_kernel(), ErrorPolicy::lenient()).unwrap();
    let cpu = &kernel.cpu_routine;

    assert_eq!(cpu.variant, InterfaceVariant::Cpu);
    assert_eq!(cpu.f_name, "launch_step_12_cpu");
    assert_eq!(cpu.c_name, None);
    assert_eq!(
        arg_names(cpu),
        vec!["grid", "block", "sharedMem", "stream", "d_x", "x_lb1", "x_n1", "n", "s"]
    );
    let host_args: Vec<&str> = cpu.args[9..].iter().map(|a| a.name.as_str()).collect();
    assert_eq!(host_args, vec!["i", "x"]);
    assert_eq!(cpu.args[10].bounds.as_deref(), Some("x_lb1:x_lb1+x_n1-1"));

    let expected = "allocate(x(x_lb1:x_lb1+x_n1-1))\n\
        CALL hipCheck(hipMemcpy(c_loc(x),d_x,8_8*SIZE(x),hipMemcpyDeviceToHost))\n\
        s = s + x(i)\n\
        CALL hipCheck(hipMemcpy(d_x,c_loc(x),8_8*SIZE(x),hipMemcpyHostToDevice))\n\
        deallocate(x)\n";
    assert_eq!(cpu.body.as_deref(), Some(expected));
}

#[test]
fn cpu_routine_keeps_launch_parameter_names() {
    let index = Index::new(vec![IndexRecord::new(RecordKind::Subroutine, "relax")
        .with_variables(vec![
            VariableDeclaration::scalar("i", "integer", ""),
            VariableDeclaration::array("grid", "real", "8", &["1"], &["64"]),
        ])]);
    let scope = ScopeCache::new()
        .resolve(&index, "relax", &ResolveOptions::default())
        .unwrap();
    let parsed = ParsedKernel {
        kernel_name: "relax_3".to_string(),
        launcher_name: "launch_relax_3".to_string(),
        parent_tag: "relax".to_string(),
        line: 3,
        identifiers: strings(&["i", "grid"]),
        loop_vars: strings(&["i"]),
        dimensions: 1,
        problem_size: vec![DimEntry::from(64)],
        ..ParsedKernel::default()
    };
    let kernel = assemble_kernel(&scope, &parsed, ErrorPolicy::lenient()).unwrap();

    assert_eq!(
        arg_names(&kernel.cpu_routine),
        vec!["grid", "block", "sharedMem", "stream", "d_grid", "grid_lb1", "grid_n1"]
    );
    let manual = arg_names(&kernel.interfaces[0]);
    assert_eq!(manual[..5].to_vec(), vec!["grid", "block", "sharedMem", "stream", "grid"]);
}

// === Accelerator routines ===

#[test]
fn routine_uses_dummy_arguments_only() {
    let parsed = ParsedRoutine {
        kernel_name: "step".to_string(),
        tag: "m:step".to_string(),
        arg_names: strings(&["x", "n", "alpha"]),
        kernel_locals: strings(&["two"]),
        c_body: "x[i] *= alpha;".to_string(),
        f_body: "x = alpha * x\n".to_string(),
        ..ParsedRoutine::default()
    };
    let kernel = assemble_routine(&scope(), &parsed, ErrorPolicy::lenient()).unwrap();
    let descriptor = &kernel.descriptor;

    assert!(!descriptor.is_loop_kernel);
    assert_eq!(descriptor.interface_name, "launch_step");
    assert_eq!(
        descriptor.interface_arg_names,
        vec!["x", "x_lb1", "x_n1", "n", "alpha"]
    );
    assert_eq!(descriptor.kernel_local_vars, vec!["double two = 2.0"]);
    assert!(descriptor.grid_dims.is_empty());

    let variants: Vec<InterfaceVariant> = kernel.interfaces.iter().map(|i| i.variant).collect();
    assert_eq!(variants, vec![InterfaceVariant::Manual]);
    assert_eq!(kernel.cpu_routine.f_name, "launch_step_cpu");
    assert!(descriptor.macros.iter().all(|m| !m.resolved));
}
