pub fn run() {
    println!("📚 BB84 in a nutshell\n");
    println!("  Preparation (Alice)  random bits encoded in random bases Z (|0⟩,|1⟩) or X (|+⟩,|−⟩)");
    println!("  Measurement (Bob)    random bases; matching bases give correlated bits (the sifted key)");
    println!("  Eavesdropper (Eve)   intercept-resend forces a basis guess; wrong guesses inject errors");
    println!("  QBER                 disagreement rate in a revealed sample; above threshold → abort");
    println!();
    println!("  A full intercept-resend attack picks the wrong basis half the time, and each");
    println!("  wrong guess flips Bob's sifted bit half the time: 0.5 × 0.5 = 25% QBER.");
    println!("  Try: quantumguard sweep --seed 42 -n 2048");
}
