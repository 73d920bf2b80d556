//! End-to-end scenarios: compile a source program and run it on the VM,
//! asserting on the exit status and captured output.

use minc_par::{compile, Options};
use minc_vm::{CaptureHost, Vm, VmError, VmOptions};

/// Compiles and runs `src` with no program arguments.
fn run_src(src: &[u8]) -> (i64, String) {
    run_with_args(src, &[])
}

fn run_with_args(src: &[u8], args: &[&str]) -> (i64, String) {
    let program = compile(src, &Options::default()).expect("compile failed");
    let args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
    let mut vm = Vm::new(program, &args, &VmOptions::default()).expect("load failed");
    let mut host = CaptureHost::new();
    let status = vm.run(&mut host).expect("run failed");
    (status, host.output_string())
}

fn run_err(src: &[u8]) -> VmError {
    let program = compile(src, &Options::default()).expect("compile failed");
    let mut vm = Vm::new(program, &[], &VmOptions::default()).expect("load failed");
    let mut host = CaptureHost::new();
    vm.run(&mut host).expect_err("expected a runtime fault")
}

#[test]
fn test_empty_main_exits_zero() {
    let (status, out) = run_src(b"int main(){ return 0; }");
    assert_eq!(status, 0);
    assert!(out.contains("exit(0) cycle ="), "{out}");
}

#[test]
fn test_arithmetic() {
    let (status, _) = run_src(b"int main(){ return 2*3 + 4; }");
    assert_eq!(status, 10);
}

#[test]
fn test_while_loop_sums() {
    let (status, _) = run_src(
        b"int main(){ int i, s; s = 0; i = 1; while (i <= 4) { s = s + i; i = i + 1; } return s; }",
    );
    assert_eq!(status, 10);
}

#[test]
fn test_malloc_and_indexing() {
    let (status, _) = run_src(
        b"int main(){ int *a; a = malloc(12); a[0] = 10; a[2] = 30; return a[0] + a[2]; }",
    );
    assert_eq!(status, 40);
}

#[test]
fn test_printf_string() {
    let (status, out) = run_src(b"int main(){ printf(\"hi\\n\"); return 0; }");
    assert_eq!(status, 0);
    assert!(out.starts_with("hi\n"), "{out}");
}

#[test]
fn test_enum_and_conditional() {
    let (status, _) = run_src(b"enum { A = 5, B, C }; int main(){ return B < C ? A + B : 0; }");
    assert_eq!(status, 11);
}

#[test]
fn test_printf_returns_byte_count() {
    let (status, out) = run_src(b"int main(){ return printf(\"ab%d\\n\", 7); }");
    assert!(out.starts_with("ab7\n"), "{out}");
    assert_eq!(status, 4);
}

#[test]
fn test_printf_multiple_arguments() {
    let (_, out) = run_src(b"int main(){ printf(\"%d %d %d %s\\n\", 1, 2, 3, \"go\"); return 0; }");
    assert!(out.starts_with("1 2 3 go\n"), "{out}");
}

#[test]
fn test_recursion() {
    let (status, _) = run_src(
        b"int fib(int n){ if (n < 2) return n; return fib(n - 1) + fib(n - 2); }
          int main(){ return fib(10); }",
    );
    assert_eq!(status, 55);
}

#[test]
fn test_nested_calls_keep_frames_balanced() {
    let (status, _) = run_src(
        b"int twice(int x){ return x + x; }
          int quad(int x){ return twice(x) + twice(x); }
          int main(){ int s; s = 0; while (s < 100) s = s + quad(5); return s; }",
    );
    assert_eq!(status, 100);
}

#[test]
fn test_pointer_arithmetic_scales_by_word() {
    let (status, _) = run_src(
        b"int main(){ int *p; int *q; p = malloc(64); q = p + 2; return (int)q - (int)p; }",
    );
    assert_eq!(status, 16);
}

#[test]
fn test_pointer_difference_in_elements() {
    let (status, _) = run_src(
        b"int main(){ int *p; int *q; p = malloc(64); q = p + 3; return q - p; }",
    );
    assert_eq!(status, 3);
}

#[test]
fn test_char_pointer_moves_by_bytes() {
    let (status, _) = run_src(
        b"int main(){ char *s; s = \"abc\"; return s[2]; }",
    );
    assert_eq!(status, 99);
}

#[test]
fn test_string_via_deref() {
    let (status, _) = run_src(b"int main(){ char *s; s = \"xyz\"; return *s; }");
    assert_eq!(status, 120);
}

#[test]
fn test_globals_persist_across_calls() {
    let (status, _) = run_src(
        b"int g;
          int bump(){ g = g + 3; return 0; }
          int main(){ g = 1; bump(); bump(); return g; }",
    );
    assert_eq!(status, 7);
}

#[test]
fn test_global_shadowed_by_parameter() {
    let (status, _) = run_src(
        b"int g;
          int f(int g){ return g * 2; }
          int main(){ g = 10; return f(3) + g; }",
    );
    assert_eq!(status, 16);
}

#[test]
fn test_post_increment_yields_original() {
    let (status, _) = run_src(b"int main(){ int i; i = 5; return i++ * 10 + i; }");
    assert_eq!(status, 56);
}

#[test]
fn test_pre_increment_yields_new_value() {
    let (status, _) = run_src(b"int main(){ int i; i = 5; return ++i * 10 + i; }");
    assert_eq!(status, 66);
}

#[test]
fn test_pointer_increment_strides_a_word() {
    let (status, _) = run_src(
        b"int main(){ int *p; int *q; p = malloc(32); q = p; ++q; return (int)q - (int)p; }",
    );
    assert_eq!(status, 8);
}

#[test]
fn test_logical_short_circuit() {
    let (status, _) = run_src(
        b"int main(){ int x; x = 0; 1 || (x = 5); 0 && (x = 7); return x; }",
    );
    assert_eq!(status, 0);
}

#[test]
fn test_logical_operators_yield_int() {
    let (status, _) = run_src(b"int main(){ return (3 && 4) + (0 || 9 > 2) + !5 + !0; }");
    assert_eq!(status, 3);
}

#[test]
fn test_bitwise_and_shifts() {
    let (status, _) = run_src(b"int main(){ return (1 << 4) + (255 >> 4) + (12 & 10) + (12 | 1) + (12 ^ 10) + ~0; }");
    // 16 + 15 + 8 + 13 + 6 - 1
    assert_eq!(status, 57);
}

#[test]
fn test_division_and_modulo() {
    let (status, _) = run_src(b"int main(){ return 17 / 5 * 10 + 17 % 5; }");
    assert_eq!(status, 32);
}

#[test]
fn test_hex_and_octal_literals() {
    let (status, _) = run_src(b"int main(){ return 0x10 + 010; }");
    assert_eq!(status, 24);
}

#[test]
fn test_char_literals() {
    let (status, _) = run_src(b"int main(){ return 'A' + '\\n'; }");
    assert_eq!(status, 75);
}

#[test]
fn test_sizeof_values() {
    let (status, _) = run_src(b"int main(){ return sizeof(int) * 10 + sizeof(char) + sizeof(char*); }");
    assert_eq!(status, 89);
}

#[test]
fn test_cast_char_truncates_on_store() {
    let (status, _) = run_src(
        b"char c; int main(){ c = 321; return c; }",
    );
    // 321 truncated to a byte is 65.
    assert_eq!(status, 65);
}

#[test]
fn test_memset_and_memcmp() {
    let (status, _) = run_src(
        b"int main(){ char *a; char *b; a = malloc(8); b = malloc(8);
           memset(a, 65, 8); memset(b, 65, 8);
           if (memcmp(a, b, 8)) return 1;
           memset(b, 66, 1);
           if (memcmp(a, b, 8) < 0) return 2;
           return 3; }",
    );
    assert_eq!(status, 2);
}

#[test]
fn test_free_is_accepted() {
    let (status, _) = run_src(
        b"int main(){ int *p; p = malloc(16); free(p); return 0; }",
    );
    assert_eq!(status, 0);
}

#[test]
fn test_open_fails_on_capture_host() {
    let (status, _) = run_src(b"int main(){ return open(\"nope\", 0) < 0; }");
    assert_eq!(status, 1);
}

#[test]
fn test_argc_argv() {
    let (status, _) = run_with_args(
        b"int main(int argc, char **argv){ return argc * 100 + argv[1][0]; }",
        &["prog", "x"],
    );
    assert_eq!(status, 2 * 100 + 'x' as i64);
}

#[test]
fn test_exit_syscall_stops_immediately() {
    let (status, out) = run_src(b"int main(){ exit(42); return 7; }");
    assert_eq!(status, 42);
    assert!(out.contains("exit(42) cycle ="), "{out}");
}

#[test]
fn test_nested_ternary() {
    let (status, _) = run_src(b"int main(){ return 0 ? 1 : 0 ? 2 : 3; }");
    assert_eq!(status, 3);
}

#[test]
fn test_address_of_local() {
    let (status, _) = run_src(
        b"int main(){ int x; int *p; x = 5; p = &x; *p = 9; return x; }",
    );
    assert_eq!(status, 9);
}

#[test]
fn test_instruction_trace() {
    let program = compile(b"int main(){ return 0; }", &Options::default()).unwrap();
    let mut vm = Vm::new(program, &[], &VmOptions { trace: true }).unwrap();
    let mut host = CaptureHost::new();
    vm.run(&mut host).unwrap();
    let out = host.output_string();
    assert!(out.contains("1> ENT "), "{out}");
    assert!(out.contains("IMM "), "{out}");
}

#[test]
fn test_null_dereference_faults() {
    let err = run_err(b"int main(){ int *p; p = 0; return *p; }");
    assert_eq!(err, VmError::BadAddress { addr: 0 });
}

#[test]
fn test_divide_by_zero_faults() {
    let err = run_err(b"int main(){ int z; z = 0; return 1 / z; }");
    assert!(matches!(err, VmError::DivideByZero { .. }));
}

#[test]
fn test_unknown_instruction_faults() {
    let program = minc_lir::Program {
        code: vec![99],
        data: Vec::new(),
        entry: 0,
        labels: Default::default(),
    };
    let mut vm = Vm::new(program, &[], &VmOptions::default()).unwrap();
    let mut host = CaptureHost::new();
    let err = vm.run(&mut host).unwrap_err();
    assert_eq!(err, VmError::UnknownInstruction { word: 99, cycle: 1 });
}
