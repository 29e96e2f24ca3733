//! Theoretical background.
//!
//! # Contents
//! - [Background](#background)
//! - [Normalization](#normalization)
//! - [Dispersion](#dispersion)
//! - [Split-step integration](#split-step-integration)
//! - [Critical powers](#critical-powers)
//! - [Correlated noise](#correlated-noise)
//!
//! # Background
//! A monochromatic beam of carrier wave number *k*₀ propagating along *z*
//! through a medium with an intensity-dependent refractive index
//! *n* = *n*₀ + *n*₂ *I* is described, in the paraxial approximation, by a
//! slowly varying envelope *A* satisfying
//! ```text
//!         ∂A                2 k₀²
//! 2 i k₀ ---- = ∇⊥² A + ------- n₂ I A
//!         ∂z                 n₀
//! ```
//! where ∇⊥² is the transverse Laplacian. Three transverse geometries are
//! handled:
//! ```text
//! slab:     ∇⊥² = ∂²/∂x²
//! radial:   ∇⊥² = ∂²/∂r² + (1/r) ∂/∂r - m²/r²
//! full:     ∇⊥² = ∂²/∂x² + ∂²/∂y²
//! ```
//! The radial form assumes an azimuthal dependence exp(*i m θ*) and reduces a
//! vortex of topological charge *m* to a one-dimensional problem.
//!
//! For *n*₂ > 0 the nonlinear term focuses the beam. Above a critical power
//! this outruns diffraction and the on-axis intensity grows without bound
//! after a finite distance (collapse); below it the beam eventually spreads.
//!
//! # Normalization
//! The field is stored dimensionless, with the physical intensity given by
//! ```text
//! I(x, z) = I₀ |A(x, z)|²
//! ```
//! where *I*₀ is fixed at construction from the requested initial power. The
//! initial envelopes are
//! ```text
//! A(ρ) = ρ^M exp(-ρ²/2) exp(i m θ)
//! ```
//! with ρ the transverse coordinate in units of the beam's characteristic
//! size. Two further scales are derived:
//! ```text
//! z_diff = k₀ a²                          (diffraction length)
//! r_kerr = 2 k₀ n₂ I₀ z_diff / n₀         (Kerr parameter)
//! ```
//! For an axisymmetric envelope of size *r*₀ the power integral is
//! ```text
//! P = I₀ ∫ |A|² dS = π r₀² Γ(M + 1) I₀
//! ```
//! which fixes *I*₀ in closed form. When noise or ellipticity breaks the
//! symmetry, the discrete sum Σ|*A*|² *δx δy* is used instead.
//!
//! # Dispersion
//! The linear index follows a three-term Sellmeier formula,
//! ```text
//! n²(ω) = S(ω) = 1 + Σ Cᵢ / uᵢ,   uᵢ = 1 - (ω / ωᵢ)²
//! ```
//! from which *k*(*ω*) = *ω n*(*ω*) / *c* and its first two derivatives
//! *k*₁ = d*k*/d*ω* and *k*₂ = d²*k*/d*ω*² are obtained analytically. Writing
//! ```text
//! T₁ = (1/2) dS/dω = Σ Cᵢ ω / (ωᵢ² uᵢ²)
//! T₂ = dT₁/dω      = Σ Cᵢ / (ωᵢ² uᵢ²) + 4 Cᵢ ω² / (ωᵢ⁴ uᵢ³)
//! ```
//! one has d*n*/d*ω* = *T*₁ / *n*, and
//! ```text
//! k₁ = (n + ω dn/dω) / c
//! k₂ = (2 dn/dω + ω d²n/dω²) / c,   d²n/dω² = (T₂ - (dn/dω)²) / n
//! ```
//! Only *k*₀ and *n*₀ enter the propagation; *k*₁ and *k*₂ are reported.
//!
//! # Split-step integration
//! Over a step *δz* the equation is split into a linear part and a nonlinear
//! part, applied in sequence.
//!
//! The linear part for the slab and radial geometries is discretized with
//! Crank-Nicolson on a uniform grid. With *c*₁ = 1/(2 *δx*²) and, for the radial
//! case, *c*₂ = 1/(4 *δr*), the tridiagonal system
//! ```text
//! -γ[i] A'[i-1] + β[i] A'[i] - α[i] A'[i+1] = δ[i]
//!
//! β[i] = 2 c₁ + 2 i k₀ / δz + (m / r[i])²
//! δ[i] = α[i] A[i+1] - (β*[i] - (m / r[i])²) A[i] + γ[i] A[i-1]
//! α[i] = c₁ + c₂ / r[i],   γ[i] = c₁ - c₂ / r[i]
//! ```
//! is solved by a single forward-elimination, back-substitution sweep (the
//! Thomas algorithm) with recursion coefficients
//! ```text
//! ξ[i+1] = α[i] / (β[i] - γ[i] ξ[i])
//! η[i+1] = (δ[i] + γ[i] η[i]) / (β[i] - γ[i] ξ[i])
//! A'[i]  = ξ[i+1] A'[i+1] + η[i+1]
//! ```
//! The left boundary sets ξ[1] = 1 (zero slope on axis) in the radial case and
//! ξ[1] = 0 (zero field) in the slab case; the field vanishes at the right
//! edge.
//!
//! For the full transverse geometry the linear part is applied exactly in
//! Fourier space,
//! ```text
//! Â(k_x, k_y) ← Â(k_x, k_y) exp(i δz (k_x² + k_y²) / 2 k₀)
//! ```
//! which makes the domain periodic.
//!
//! The nonlinear part leaves |*A*| unchanged and rotates the phase locally,
//! ```text
//! A ← A exp(-i k₀ n₂ I₀ |A|² δz / n₀) = A exp(-i r_kerr |A|² δz / 2 z_diff)
//! ```
//! using the intensity of the previous step.
//!
//! The step is shrunk whenever the on-axis nonlinear phase of the next step,
//! ```text
//! φ = k₀ n₂ I_max δz / n₀
//! ```
//! would exceed a ceiling φ_max, replacing *δz* by 0.8 (φ_max / φ) *δz*. It is
//! never grown back.
//!
//! # Critical powers
//! For a Gaussian beam,
//! ```text
//! P_G = 3.77 λ² / (8 π n₀ n₂)
//! ```
//! and for a vortex of charge *m*[^1],
//! ```text
//!                 2^(2m + 1) Γ(m + 1) Γ(m + 2)
//! P_V(m) = P_G -------------------------------
//!                        2 Γ(2m + 1)
//! ```
//! Marburger's empirical fit[^2] gives the self-focusing distance of a
//! collimated Gaussian beam,
//! ```text
//!                     0.367 z_diff
//! z_sf = ----------------------------------------
//!        sqrt((sqrt(P / P_G) - 0.852)² - 0.0219)
//! ```
//!
//! # Correlated noise
//! A complex noise field with a Gaussian autocorrelation of radius *r*_c is
//! synthesized in frequency space: independent uniform deviates on
//! [-√3, √3] (unit variance) in each channel are weighted by
//! ```text
//! cf exp(-d (kᵢ² + kⱼ²)),   s = ⌊r_c / max(δx, δy)⌋ / max(n_x, n_y)
//! cf = s sqrt(π v),   d = (π s)² / 2
//! ```
//! over signed integer frequencies (*kᵢ*, *kⱼ*), and brought back to real space
//! by an unnormalized inverse transform. The realized correlation radius is
//! read off as the lag at which the axis-wise autocorrelation first drops
//! below 1/e of its value at zero lag.
//!
//! [^1]: L. T. Vuong *et al.*, "Collapse of optical vortices." Phys. Rev.
//! Lett. **96**, 133901 (2006).
//!
//! [^2]: J. H. Marburger, "Self-focusing: Theory." Prog. Quantum Electron.
//! **4**, 35 (1975).
